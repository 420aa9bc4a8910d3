//! Grading logic for Scigrade
//!
//! Pure transforms applied around one interpreter run: stripping termination
//! directives from the submission, classifying the raw process outcome and
//! turning it into a student-facing verdict.

pub use crate::grading::classify::{Classification, classify, find_error_record};
pub use crate::grading::format::{MESSAGE_HEADER, assemble_verdict, normalize_output};
pub use crate::grading::sanitize::{Sanitized, TERMINATION_WARNING, sanitize};

mod classify;
mod format;
mod sanitize;
