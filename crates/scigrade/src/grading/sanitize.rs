//! Termination directive stripping
//!
//! Reference scripts signal success through the interpreter's exit status, so
//! a submission that calls `exit`, `quit` or `abort` itself could end the
//! session with any status it likes. Those directives are cut from the line
//! they appear on before the submission is staged.

use crate::config::SanitizerConfig;

/// Prefix added to the failure message when directives were stripped
pub const TERMINATION_WARNING: &str = "Please do not use exit, quit and abort commands in your code.\n\
                                       Otherwise your code will not be evaluated correctly.\n";

/// Result of sanitizing a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// Source text with directives removed
    pub source: String,

    /// Whether any line was changed
    pub stripped: bool,
}

impl Sanitized {
    /// The warning to prepend to a failure message, if any
    pub fn warning(&self) -> Option<&'static str> {
        self.stripped.then_some(TERMINATION_WARNING)
    }
}

/// Strip termination directives from submitted source.
///
/// Leading whitespace of the whole submission is trimmed first. On each line
/// everything from the earliest directive keyword to the end of the line is
/// removed; line terminators are kept so line numbers in later error reports
/// still match what the student wrote.
pub fn sanitize(source: &str, config: &SanitizerConfig) -> Sanitized {
    let source = source.trim_start();
    let mut sanitized = String::with_capacity(source.len());
    let mut stripped = false;

    for chunk in source.split_inclusive('\n') {
        let (line, ending) = split_line_ending(chunk);
        match find_directive(line, &config.directives, config.word_boundary) {
            Some(pos) => {
                sanitized.push_str(&line[..pos]);
                stripped = true;
            }
            None => sanitized.push_str(line),
        }
        sanitized.push_str(ending);
    }

    Sanitized {
        source: sanitized,
        stripped,
    }
}

/// Byte offset of the earliest directive keyword in `line`
fn find_directive(line: &str, directives: &[String], word_boundary: bool) -> Option<usize> {
    directives
        .iter()
        .filter(|d| !d.is_empty())
        .filter_map(|directive| {
            line.match_indices(directive.as_str())
                .map(|(pos, _)| pos)
                .find(|&pos| !word_boundary || stands_alone(line, pos, directive.len()))
        })
        .min()
}

/// Check that the match at `pos..pos + len` is not part of a longer identifier
fn stands_alone(line: &str, pos: usize, len: usize) -> bool {
    let before = line[..pos].chars().next_back();
    let after = line[pos + len..].chars().next();
    !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn split_line_ending(chunk: &str) -> (&str, &str) {
    if let Some(line) = chunk.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = chunk.strip_suffix('\n') {
        (line, "\n")
    } else {
        (chunk, "")
    }
}
