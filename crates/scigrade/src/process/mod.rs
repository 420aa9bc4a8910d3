//! Interpreter process execution
//!
//! The evaluator only needs one capability from its environment: run a shell
//! command line to completion and hand back the exit status and both output
//! streams. [`ProcessRunner`] is that seam; [`ShellRunner`] is the production
//! implementation, tests plug in their own.
//!
//! Timeouts and resource limits are not enforced here. A supervisor that
//! kills the interpreter simply produces an outcome without the reserved
//! success status. Dropping a pending [`ProcessRunner::run`] future must
//! stop every process the command line started.

use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use crate::process::shell::ShellRunner;
use crate::types::ExecutionOutcome;

mod shell;

/// Errors that occur while running the interpreter process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to run {shell}: {source}")]
    Spawn {
        shell: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect output of {shell}: {source}")]
    Wait {
        shell: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("process runner failed: {0}")]
    Failed(String),
}

/// Runs a shell command line and captures its outcome
pub trait ProcessRunner: Send + Sync {
    /// Run `command` in `working_dir`, blocking the evaluation until the
    /// process exits or is killed
    fn run(
        &self,
        command: &str,
        working_dir: &Path,
    ) -> impl Future<Output = Result<ExecutionOutcome, ProcessError>> + Send;
}
