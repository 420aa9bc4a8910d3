//! Shell-backed process runner

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::process::{ProcessError, ProcessRunner};
use crate::types::ExecutionOutcome;

/// Runs command lines through `<shell> -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
}

impl ShellRunner {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.shell.clone())
    }

    /// Get the shell path
    pub fn shell(&self) -> &Path {
        &self.shell
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

impl ProcessRunner for ShellRunner {
    #[instrument(skip(self, command))]
    async fn run(
        &self,
        command: &str,
        working_dir: &Path,
    ) -> Result<ExecutionOutcome, ProcessError> {
        debug!(shell = %self.shell.display(), command, "running session");

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // The shell leads a fresh process group holding the whole pipeline
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            shell: self.shell.clone(),
            source,
        })?;

        // Killed on drop, so a cancelled run takes the pipeline with it
        let group = ProcessGroup::new(child.id());
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let wait = async {
            let status = child.wait().await;
            // Leftover background processes would keep the pipes open
            group.kill();
            status
        };
        let (status, stdout, stderr) =
            tokio::join!(wait, read_stream(stdout), read_stream(stderr));

        let wait_error = |source| ProcessError::Wait {
            shell: self.shell.clone(),
            source,
        };
        let status = status.map_err(wait_error)?;
        let stdout = stdout.map_err(wait_error)?;
        let stderr = stderr.map_err(wait_error)?;

        let outcome = ExecutionOutcome {
            status: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        };

        if outcome.status.is_none() {
            warn!(%status, "session terminated without exit code");
        }

        debug!(
            status = ?outcome.status,
            stdout_len = outcome.stdout.len(),
            stderr_len = outcome.stderr.len(),
            "session complete"
        );

        Ok(outcome)
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Process group of one running session, killed at most once
#[derive(Debug)]
struct ProcessGroup {
    #[cfg(unix)]
    pgid: Option<Pid>,
    killed: AtomicBool,
}

impl ProcessGroup {
    #[cfg(unix)]
    fn new(leader: Option<u32>) -> Self {
        Self {
            pgid: leader.and_then(|pid| i32::try_from(pid).ok()).map(Pid::from_raw),
            killed: AtomicBool::new(false),
        }
    }

    #[cfg(not(unix))]
    fn new(_leader: Option<u32>) -> Self {
        Self {
            killed: AtomicBool::new(false),
        }
    }

    /// SIGKILL every process still in the group
    fn kill(&self) {
        if self.killed.swap(true, Ordering::AcqRel) {
            return;
        }

        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            match killpg(pgid, Signal::SIGKILL) {
                Ok(()) => debug!(%pgid, "killed session process group"),
                // Nothing left in the group
                Err(Errno::ESRCH) => {}
                Err(e) => warn!(%pgid, error = %e, "failed to kill session process group"),
            }
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}
