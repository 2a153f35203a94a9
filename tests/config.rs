//! Tests for engine configuration loading.
use nodeweave::config::{DEFAULT_HISTORY_LIMIT, DEFAULT_SYNC_QUEUE_CAPACITY};
use nodeweave::prelude::*;
use std::io::Write;

#[test]
fn test_empty_config_uses_defaults() {
    let config = EngineConfig::from_toml_str("").expect("valid");
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    assert_eq!(config.sync_queue_capacity, DEFAULT_SYNC_QUEUE_CAPACITY);
}

#[test]
fn test_overrides_are_applied() {
    let config = EngineConfig::from_toml_str("history_limit = 10\nsync_queue_capacity = 16")
        .expect("valid");
    assert_eq!(config.history_limit, 10);
    assert_eq!(config.sync_queue_capacity, 16);
}

#[test]
fn test_zero_queue_capacity_is_rejected() {
    let err = EngineConfig::from_toml_str("sync_queue_capacity = 0").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            key: "sync_queue_capacity",
            ..
        }
    ));
}

#[test]
fn test_unknown_keys_and_bad_types_are_parse_errors() {
    assert!(matches!(
        EngineConfig::from_toml_str("undo_depth = 5"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        EngineConfig::from_toml_str("history_limit = \"lots\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "history_limit = 7").expect("write");

    let config = EngineConfig::from_file(file.path()).expect("valid");
    assert_eq!(config.history_limit, 7);

    let missing = file.path().with_extension("missing");
    assert!(matches!(
        EngineConfig::from_file(&missing),
        Err(ConfigError::Io { .. })
    ));
}
