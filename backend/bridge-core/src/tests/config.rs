use crate::config::BridgeConfig;
use crate::error::ConfigError;

use common::protocol::STATE_UPDATE_EVENT;

use std::time::Duration;

use tempfile::TempDir;

#[test]
fn given_missing_file_when_loading_then_returns_defaults() {
    let dir = TempDir::new().unwrap();

    let config = BridgeConfig::load(dir.path()).unwrap();

    assert_eq!(config, BridgeConfig::default());
    assert_eq!(config.event_name, STATE_UPDATE_EVENT);
    assert_eq!(config.sweep_interval(), Duration::from_secs(1));
}

/// **VALUE**: A partial file only overrides what it names.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` that makes
/// every field mandatory.
#[test]
fn given_partial_file_when_loading_then_missing_fields_use_defaults() {
    // GIVEN: A file setting only the interval
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("statebridge.json"), r#"{ "sweep_interval_ms": 250 }"#).unwrap();

    // WHEN: Loading
    let config = BridgeConfig::load(dir.path()).unwrap();

    // THEN: Interval overridden, everything else default
    assert_eq!(config.sweep_interval_ms, 250);
    assert!(config.dedupe_broadcasts);
    assert!(config.retry_failed_delivery);
    assert_eq!(config.event_name, STATE_UPDATE_EVENT);
}

#[test]
fn given_corrupt_file_when_loading_then_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("statebridge.json"), "{ not json").unwrap();

    let result = BridgeConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_out_of_range_interval_when_loading_then_validation_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("statebridge.json"), r#"{ "sweep_interval_ms": 10 }"#).unwrap();

    let result = BridgeConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_empty_event_name_when_validating_then_validation_error() {
    let config = BridgeConfig {
        event_name: "  ".to_string(),
        ..BridgeConfig::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::ValidationError { .. })));
}
