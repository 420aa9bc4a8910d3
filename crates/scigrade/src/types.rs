use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A student submission (the `metadata` bundle handed over by the caller)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    /// Raw source text as typed by the student
    pub user_answer: String,

    /// Auxiliary files copied next to the submission before execution
    #[serde(default)]
    pub file_paths: Option<Vec<PathBuf>>,

    /// Whether a passing run earns partial credit
    #[serde(default)]
    pub partial_grading: bool,
}

impl Submission {
    /// Create a submission from source text with no auxiliary files
    pub fn new(user_answer: impl Into<String>) -> Self {
        Self {
            user_answer: user_answer.into(),
            file_paths: None,
            partial_grading: false,
        }
    }

    /// Add an auxiliary file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_paths.get_or_insert_with(Vec::new).push(path.into());
        self
    }

    /// Enable or disable partial grading
    pub fn with_partial_grading(mut self, enabled: bool) -> Self {
        self.partial_grading = enabled;
        self
    }

    /// Auxiliary files, empty if none were given
    pub fn files(&self) -> &[PathBuf] {
        self.file_paths.as_deref().unwrap_or_default()
    }
}

/// A reference test case (the `test_case_data` bundle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Path of the reference script executed against the submission
    pub test_case: String,

    /// Grading weight, applied by the caller
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl TestCase {
    pub fn new(test_case: impl Into<String>) -> Self {
        Self {
            test_case: test_case.into(),
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

fn default_weight() -> f64 {
    1.0
}

/// Raw result of one interpreter run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Exit code if the process exited normally, `None` if it was terminated
    /// by a signal
    pub status: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl ExecutionOutcome {
    pub fn new(status: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Check if the process exited with exactly the given code
    #[must_use]
    pub fn exited_with(&self, code: i32) -> bool {
        self.status == Some(code)
    }
}

/// Final grading result of one evaluation
///
/// Construct through [`Verdict::passed`] or [`Verdict::failed`]: a passing
/// verdict never carries an error, and credit is only granted on a pass with
/// partial grading enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the reference checks passed
    pub success: bool,

    /// Message shown to the student on failure
    pub error: Option<String>,

    /// Credit multiplier in `[0, 1]`, applied by the caller to the weight
    pub mark_fraction: f64,
}

impl Verdict {
    /// A passing verdict
    pub fn passed(partial_grading: bool) -> Self {
        Self {
            success: true,
            error: None,
            mark_fraction: if partial_grading { 1.0 } else { 0.0 },
        }
    }

    /// A failing verdict with the message shown to the student
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            mark_fraction: 0.0,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }
}
