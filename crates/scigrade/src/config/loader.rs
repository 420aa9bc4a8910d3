//! Configuration file loading for Scigrade
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};

use crate::config::{Config, ConfigError, ENV_PREFIX};

impl Config {
    /// Load configuration from a file
    ///
    /// Values may be overridden from the environment, e.g.
    /// `SCIGRADE_INTERPRETER__BINARY=/opt/scilab/bin/scilab-cli`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        let interpreter = &self.interpreter;
        if interpreter.binary.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter binary is empty".to_owned(),
            ));
        }
        if interpreter.error_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter error marker is empty".to_owned(),
            ));
        }
        if interpreter.error_marker.contains('\n') {
            return Err(ConfigError::Invalid(
                "interpreter error marker spans lines".to_owned(),
            ));
        }
        if self.shell.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("shell is empty".to_owned()));
        }

        for directive in &self.sanitizer.directives {
            if directive.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "sanitizer has an empty directive".to_owned(),
                ));
            }
        }

        Ok(())
    }
}
