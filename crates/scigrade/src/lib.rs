//! A library for grading Scilab submissions.
//!
//! Scigrade runs a student's Scilab code against a reference test script with
//! `scilab-cli` and turns the raw process outcome into a verdict: pass/fail,
//! an optional partial-credit fraction, and a message explaining a failure.
//!
//! # Features
//!
//! - **Directive stripping** — `exit`, `quit` and `abort` are cut from submissions so they cannot fake the session's exit status.
//! - **Exit-status protocol** — only the reserved status set by the reference script counts as a pass.
//! - **Error records** — interpreter errors are reported verbatim, ahead of any exit status.
//! - **Stable messages** — program output is normalized into a diff-friendly report.
//! - **Isolated staging** — each evaluation works in its own directory, removed afterwards.
//! - **TOML configuration** — interpreter binary, success status and directive list are configurable.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, RESERVED_SUCCESS_STATUS};
pub use evaluator::{EvaluateError, Evaluator};
pub use grading::{Classification, MESSAGE_HEADER, Sanitized, TERMINATION_WARNING};
pub use process::{ProcessError, ProcessRunner, ShellRunner};
pub use session::Session;
pub use staging::{StagedArtifact, StagingError};
pub use types::{ExecutionOutcome, Submission, TestCase, Verdict};

pub mod config;
pub mod evaluator;
pub mod grading;
pub mod process;
pub mod session;
pub mod staging;
pub mod types;
