//! Evaluation of one submission against one reference script
//!
//! Stage, execute, classify, format, tear down. Teardown runs whatever
//! happened before it.

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::grading::{Sanitized, assemble_verdict, classify, sanitize};
use crate::process::{ProcessError, ProcessRunner, ShellRunner};
use crate::session::Session;
use crate::staging::{StagedArtifact, StagingError};
use crate::types::{Submission, TestCase, Verdict};

/// Errors that prevent an evaluation from producing a verdict
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("staging error: {0}")]
    Staging(#[from] StagingError),

    #[error("process error: {0}")]
    Process(#[from] ProcessError),
}

/// Grades submissions by running them against reference scripts
///
/// Each call to [`evaluate`](Self::evaluate) stages into its own directory,
/// so one evaluator can serve concurrent evaluations.
#[derive(Debug, Clone)]
pub struct Evaluator<R = ShellRunner> {
    config: Config,
    runner: R,
}

impl Evaluator<ShellRunner> {
    /// Create an evaluator running sessions through the configured shell
    pub fn new(config: Config) -> Self {
        let runner = ShellRunner::from_config(&config);
        Self { config, runner }
    }

    /// Create an evaluator with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }
}

impl<R: ProcessRunner> Evaluator<R> {
    /// Create an evaluator with a custom process runner
    pub fn with_runner(config: Config, runner: R) -> Self {
        Self { config, runner }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the process runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Evaluate a submission against a test case
    ///
    /// Always yields a verdict unless staging or launching the interpreter
    /// fails; the staged files are removed in either case.
    #[instrument(skip_all, fields(test_case = %test_case.test_case))]
    pub async fn evaluate(
        &self,
        submission: &Submission,
        test_case: &TestCase,
    ) -> Result<Verdict, EvaluateError> {
        let sanitized = sanitize(&submission.user_answer, &self.config.sanitizer);
        if sanitized.stripped {
            debug!("stripped termination directives from submission");
        }

        let mut artifact = StagedArtifact::create(&self.config.working_dir()).await?;
        let result = self
            .run_staged(&mut artifact, &sanitized, submission, test_case)
            .await;

        if let Err(e) = artifact.teardown().await {
            warn!(error = %e, "failed to tear down staged submission");
        }

        if let Ok(ref verdict) = result {
            debug!(
                success = verdict.success,
                mark_fraction = verdict.mark_fraction,
                "evaluation complete"
            );
        }
        result
    }

    async fn run_staged(
        &self,
        artifact: &mut StagedArtifact,
        sanitized: &Sanitized,
        submission: &Submission,
        test_case: &TestCase,
    ) -> Result<Verdict, EvaluateError> {
        // Auxiliary files first, so one named like the submission cannot
        // replace it
        artifact.copy_files(submission.files()).await?;
        artifact
            .write_file(
                self.config.interpreter.source_name.as_str(),
                sanitized.source.as_bytes(),
            )
            .await?;
        debug!(dir = %artifact.path().display(), "submission staged");

        let reference = self.config.resolve_reference(&test_case.test_case);
        let session = Session::grading(&self.config.interpreter, reference);
        let outcome = self
            .runner
            .run(&session.command_line(), artifact.path())
            .await?;
        debug!(status = ?outcome.status, "session executed");

        if !outcome.stderr.trim().is_empty() {
            debug!(stderr = %outcome.stderr, "interpreter wrote to stderr");
        }

        let classification = classify(&outcome, &self.config.interpreter);
        debug!(success = classification.is_success(), "session classified");

        Ok(assemble_verdict(
            classification,
            sanitized.warning(),
            submission.partial_grading,
        ))
    }
}
