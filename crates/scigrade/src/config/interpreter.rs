use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::config::ConfigError;
use crate::staging::is_plain_file_name;

/// Exit status produced when the reference script reaches its success path.
///
/// Reference scripts call `exit(5)` once all checks pass; a clean end of
/// script, an uncaught error or a crash all produce something else.
pub const RESERVED_SUCCESS_STATUS: i32 = 5;

/// Scilab prefixes its error reports with this marker
pub const DEFAULT_ERROR_MARKER: &str = "!";

/// Default interpreter binary
pub const DEFAULT_INTERPRETER: &str = "scilab-cli";

/// Default name of the staged submission file.
///
/// Reference scripts load the submission with `exec("function.sci")`.
pub const DEFAULT_SOURCE_NAME: &str = "function.sci";

/// Directives that end a Scilab session
pub const DEFAULT_DIRECTIVES: [&str; 3] = ["exit", "quit", "abort"];

/// Configuration of the interpreter integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Interpreter binary (resolved through PATH by the shell)
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Arguments putting the interpreter in non-interactive batch mode
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Exit status meaning "reference checks passed"
    #[serde(default = "default_success_status")]
    pub success_status: i32,

    /// Marker starting an interpreter error record in stdout
    #[serde(default = "default_error_marker")]
    pub error_marker: String,

    /// File name of the staged submission
    #[serde(default = "default_source_name")]
    pub source_name: SourceName,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            args: default_args(),
            success_status: default_success_status(),
            error_marker: default_error_marker(),
            source_name: default_source_name(),
        }
    }
}

/// Configuration of termination directive stripping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Keywords stripped (with the rest of their line) from submissions
    #[serde(default = "default_directives")]
    pub directives: Vec<String>,

    /// Only match keywords that stand alone as identifiers.
    ///
    /// When false, a keyword matches anywhere in a line, so `exit_code = 1`
    /// loses everything from `exit` onwards.
    #[serde(default = "default_word_boundary")]
    pub word_boundary: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            directives: default_directives(),
            word_boundary: default_word_boundary(),
        }
    }
}

/// Plain file name for the staged submission (no separators, no `..`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceName(String);

impl SourceName {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        if !is_plain_file_name(name) {
            return Err(ConfigError::InvalidSourceName(name.to_owned()));
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for SourceName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SourceName::new(&s).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a plain file name without path separators",
            )
        })
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from(DEFAULT_INTERPRETER)
}

fn default_args() -> Vec<String> {
    vec!["-nb".to_owned()]
}

fn default_success_status() -> i32 {
    RESERVED_SUCCESS_STATUS
}

fn default_error_marker() -> String {
    DEFAULT_ERROR_MARKER.to_owned()
}

fn default_source_name() -> SourceName {
    SourceName(DEFAULT_SOURCE_NAME.to_owned())
}

fn default_directives() -> Vec<String> {
    DEFAULT_DIRECTIVES.iter().map(|d| (*d).to_owned()).collect()
}

fn default_word_boundary() -> bool {
    true
}
