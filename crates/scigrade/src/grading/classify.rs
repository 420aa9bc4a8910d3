//! Classification of interpreter runs
//!
//! An interpreter error record in stdout always wins. Without one, the exit
//! status decides: only the reserved success status counts as a pass, every
//! other way the session can end (end of script, crash, kill) is a failed
//! check.

use crate::config::InterpreterConfig;
use crate::grading::format::normalize_output;
use crate::types::ExecutionOutcome;

/// How a run ended, from the grader's point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The reference script reached its success exit
    Passed,

    /// The interpreter reported an error; holds the error record verbatim
    InterpreterError(String),

    /// The run completed without an interpreter error but the reference
    /// checks did not pass; holds the normalized stdout
    CheckFailed(String),
}

impl Classification {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Passed)
    }

    /// The error text, if the run failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Classification::Passed => None,
            Classification::InterpreterError(text) | Classification::CheckFailed(text) => {
                Some(text)
            }
        }
    }

    pub fn into_error(self) -> Option<String> {
        match self {
            Classification::Passed => None,
            Classification::InterpreterError(text) | Classification::CheckFailed(text) => {
                Some(text)
            }
        }
    }
}

/// Classify a finished interpreter run
///
/// stderr is not consulted: Scilab writes its error records to stdout.
pub fn classify(outcome: &ExecutionOutcome, interpreter: &InterpreterConfig) -> Classification {
    if let Some(record) = find_error_record(&outcome.stdout, &interpreter.error_marker) {
        return Classification::InterpreterError(record.to_owned());
    }

    let output = normalize_output(&outcome.stdout);
    if outcome.exited_with(interpreter.success_status) {
        Classification::Passed
    } else {
        Classification::CheckFailed(output)
    }
}

/// Find the first interpreter error record in `output`.
///
/// A record is a line whose first non-blank text is `marker` followed by at
/// least one more character, together with the non-empty line right after
/// it. The returned slice runs from the marker to the end of that second
/// line.
pub fn find_error_record<'a>(output: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }

    let mut lines = line_spans(output).peekable();
    while let Some((start, line)) = lines.next() {
        let Some(&(next_start, next)) = lines.peek() else {
            break;
        };

        let indent = line.len() - line.trim_start().len();
        let content = &line[indent..];
        if content.starts_with(marker) && content.len() > marker.len() && !next.is_empty() {
            return Some(&output[start + indent..next_start + next.len()]);
        }
    }
    None
}

/// Lines of `text` split on `\n`, with their byte offsets
fn line_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len() + 1;
        Some((start, line))
    })
}
