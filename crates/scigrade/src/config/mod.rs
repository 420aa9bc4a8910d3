use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::interpreter::{
    DEFAULT_DIRECTIVES, DEFAULT_ERROR_MARKER, DEFAULT_INTERPRETER, DEFAULT_SOURCE_NAME,
    InterpreterConfig, RESERVED_SUCCESS_STATUS, SanitizerConfig, SourceName,
};

pub mod interpreter;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../scigrade.example.toml");

/// Prefix for environment variable overrides (e.g. `SCIGRADE_INTERPRETER__BINARY`)
pub const ENV_PREFIX: &str = "SCIGRADE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid submission file name '{0}': must be a plain file name")]
    InvalidSourceName(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for Scigrade
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root directory under which each evaluation stages its files.
    ///
    /// Defaults to `scigrade` inside the OS temporary directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Base directory for relative reference script paths.
    ///
    /// The interpreter runs inside the staging directory, so relative test
    /// case paths are made absolute against this directory (or the current
    /// directory when unset) before the session is composed.
    #[serde(default)]
    pub reference_dir: Option<PathBuf>,

    /// Shell used to run the composed command line
    #[serde(default = "default_shell")]
    pub shell: PathBuf,

    /// Interpreter integration settings
    #[serde(default)]
    pub interpreter: InterpreterConfig,

    /// Termination directive stripping
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
}

impl Config {
    /// Create a new config from the embedded example
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with built-in defaults and no paths set
    pub fn empty() -> Self {
        Self {
            working_dir: None,
            reference_dir: None,
            shell: default_shell(),
            interpreter: InterpreterConfig::default(),
            sanitizer: SanitizerConfig::default(),
        }
    }

    /// Get the staging root directory
    pub fn working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("scigrade"))
    }

    /// Resolve a reference script path to the location handed to the interpreter
    pub fn resolve_reference(&self, test_case: &str) -> PathBuf {
        let path = Path::new(test_case);
        let joined = match &self.reference_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        };
        std::path::absolute(&joined).unwrap_or(joined)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

fn default_shell() -> PathBuf {
    PathBuf::from("/bin/sh")
}
