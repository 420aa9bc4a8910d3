//! Interpreter session composition
//!
//! Builds the directive sequence fed to the interpreter on stdin and the
//! shell command line that pipes it in. The sequence always ends with
//! `quit()`, so the only way to get the reserved success status is for the
//! reference script to call `exit` with it.

use std::path::{Path, PathBuf};

use crate::config::InterpreterConfig;

/// `exec` mode echoing each executed line, so failing checks show up in the
/// captured output
pub const EXEC_MODE: i32 = 2;

/// One instruction sent to the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `lines(0)`: no pagination prompts in batch mode
    DisablePager,
    /// `exec('<script>', <mode>);`
    Exec { script: PathBuf, mode: i32 },
    /// `quit();`
    Quit,
}

impl Directive {
    /// Render as Scilab source
    pub fn render(&self) -> String {
        match self {
            Directive::DisablePager => "lines(0)".to_owned(),
            Directive::Exec { script, mode } => {
                format!(
                    "exec({},{mode});",
                    scilab_string(&script.to_string_lossy())
                )
            }
            Directive::Quit => "quit();".to_owned(),
        }
    }
}

/// Builder for an interpreter session
#[derive(Debug, Clone)]
pub struct Session {
    /// Interpreter binary
    binary: PathBuf,
    /// Batch mode arguments
    args: Vec<String>,
    directives: Vec<Directive>,
}

impl Session {
    /// Create an empty session for the given interpreter binary
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Standard grading session: disable pagination, run the reference
    /// script, quit.
    ///
    /// The reference path is used as given; whether it exists is checked by
    /// the interpreter, not here.
    pub fn grading(interpreter: &InterpreterConfig, reference: impl Into<PathBuf>) -> Self {
        Self::new(interpreter.binary.clone())
            .args(interpreter.args.iter().cloned())
            .directive(Directive::DisablePager)
            .directive(Directive::Exec {
                script: reference.into(),
                mode: EXEC_MODE,
            })
            .directive(Directive::Quit)
    }

    /// Add interpreter arguments
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a directive
    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Get the interpreter binary path
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Get the directives in order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// The directive script as the interpreter reads it on stdin
    pub fn script(&self) -> String {
        self.directives
            .iter()
            .map(Directive::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The shell command line: the directives printed one per line and piped
    /// into the interpreter
    pub fn command_line(&self) -> String {
        let mut command = String::from("printf '%s\\n'");
        for directive in &self.directives {
            command.push(' ');
            command.push_str(&shell_quote(&directive.render()));
        }

        command.push_str(" | ");
        command.push_str(&shell_quote(&self.binary.to_string_lossy()));
        for arg in &self.args {
            command.push(' ');
            command.push_str(&shell_quote(arg));
        }
        command
    }
}

/// Quote a string for POSIX `sh`
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Quote a string as a Scilab string literal
pub fn scilab_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''").replace('"', "\"\""))
}
