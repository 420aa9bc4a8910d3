//! Output normalization and verdict assembly

use crate::grading::classify::Classification;
use crate::types::Verdict;

/// First line of every normalized message
pub const MESSAGE_HEADER: &str = "Message";

/// Normalize interpreter output into a stable, diff-friendly message.
///
/// The result starts with [`MESSAGE_HEADER`], followed by every non-blank
/// line of `text`, trimmed, in order. A leading header line in `text` is not
/// repeated, so normalizing twice gives the same message.
///
/// The flip side: a program whose first non-blank output line is exactly
/// `Message` loses that line, e.g. `"Message\nresult 3"` normalizes to itself
/// rather than to `"Message\nMessage\nresult 3"`.
pub fn normalize_output(text: &str) -> String {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty()).peekable();
    if lines.peek() == Some(&MESSAGE_HEADER) {
        lines.next();
    }

    let mut message = String::from(MESSAGE_HEADER);
    for line in lines {
        message.push('\n');
        message.push_str(line);
    }
    message
}

/// Build the final verdict for a classified run
///
/// `warning` is prepended to the error message of a failed run.
pub fn assemble_verdict(
    classification: Classification,
    warning: Option<&str>,
    partial_grading: bool,
) -> Verdict {
    match classification.into_error() {
        None => Verdict::passed(partial_grading),
        Some(error) => match warning {
            Some(warning) => Verdict::failed(format!("{warning}{error}")),
            None => Verdict::failed(error),
        },
    }
}
