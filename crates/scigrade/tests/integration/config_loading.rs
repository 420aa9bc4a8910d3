use std::path::PathBuf;

use scigrade::config::{Config, ConfigError};

use super::FIXTURES_PATH;

#[test]
fn test_load_valid_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_full.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.working_dir(), PathBuf::from("/var/lib/scigrade"));
    assert_eq!(
        config.interpreter.binary,
        PathBuf::from("/opt/scilab/bin/scilab-cli")
    );
    assert_eq!(config.interpreter.success_status, 5);
    assert_eq!(config.interpreter.source_name.as_str(), "function.sci");
    assert_eq!(config.sanitizer.directives, vec!["exit", "quit", "abort"]);
    assert_eq!(
        config.resolve_reference("add/test.sci"),
        PathBuf::from("/srv/scigrade/tests/add/test.sci")
    );
}

#[test]
fn test_load_minimal_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_minimal.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert_eq!(config.interpreter.binary, PathBuf::from("scilab-cli"));
    assert_eq!(config.interpreter.success_status, 5);
    assert_eq!(config.interpreter.error_marker, "!");
    assert!(config.sanitizer.word_boundary);
    assert_eq!(config.shell, PathBuf::from("/bin/sh"));
}

#[test]
fn test_load_invalid_empty_binary() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_binary.toml");
    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_invalid_source_name() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_source_name.toml");
    let result = Config::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_empty_directive() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_directive.toml");
    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_missing_file() {
    let path = format!("{FIXTURES_PATH}/configs/does_not_exist.toml");
    let result = Config::from_file(&path);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_example_config_round_trips_through_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scigrade.toml");
    std::fs::write(&path, scigrade::EXAMPLE_CONFIG).unwrap();

    let config = Config::from_file(&path).expect("Failed to load example config");
    let default = Config::default();
    assert_eq!(config.interpreter.binary, default.interpreter.binary);
    assert_eq!(config.sanitizer.directives, default.sanitizer.directives);
}
