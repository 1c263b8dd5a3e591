//! Config file loading and validation through the public API.

use std::fs;
use tempfile::TempDir;
use tw_core::config::{load_config, load_config_from_file, ConfigError, ConfigOptions};
use tw_core::registry::EvictionPolicy;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn full_config_round_trips_through_loader() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "registry": {"capacity": 25, "eviction": {"idle_after_seconds": 120.0}, "seed": 99},
            "estimator": {
                "visible": {"mean": 0.1, "variance": 0.004},
                "covered": {"mean": 0.7, "variance": 6.0},
                "transition_rate": 0.2,
                "decay_seconds": 5.0,
                "num_samples": 20,
                "window_capacity": 50
            },
            "transport": {"device": "/dev/ttyACM0", "baud_rate": 115200, "read_timeout_ms": 250}
        }"#,
    );

    let resolved = load_config(&ConfigOptions {
        config_path: Some(path.clone()),
    })
    .unwrap();
    let config = resolved.config;
    assert_eq!(resolved.source_path, Some(path));
    assert_eq!(config.registry.capacity, 25);
    assert_eq!(config.registry.eviction, EvictionPolicy::IdleAfterSeconds(120.0));
    assert_eq!(config.estimator.visible.mean, 0.1);
    assert_eq!(config.estimator.window_capacity, 50);
    assert_eq!(config.transport.read_timeout_ms, 250);
    assert_eq!(
        config.transport.device.as_deref(),
        Some(std::path::Path::new("/dev/ttyACM0"))
    );
}

#[test]
fn empty_object_means_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "{}");
    let config = load_config_from_file(&path).unwrap();
    assert_eq!(config, tw_core::config::Config::default());
}

#[test]
fn unknown_section_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"registery": {"capacity": 3}}"#);
    assert!(matches!(
        load_config_from_file(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn invalid_variance_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"estimator": {"visible": {"mean": 0.1, "variance": -1.0}}}"#,
    );
    let err = load_config(&ConfigOptions {
        config_path: Some(path),
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
    let common: tw_common::Error = err.into();
    assert_eq!(common.code(), 11);
}
