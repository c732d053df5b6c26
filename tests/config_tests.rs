// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use std::path::PathBuf;
use viewfinder::backends::camera::{LensFacing, Rotation};
use viewfinder::{BitratePreset, Config};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.lens_facing, LensFacing::Back);
    assert!(config.allow_external_fallback);
    assert!(config.record_audio, "Audio should be recorded by default");
    assert_eq!(config.bitrate_preset, BitratePreset::Medium);
    assert!(config.media_dir.is_none());
}

#[test]
fn test_config_partial_json_uses_defaults() {
    let config = Config::from_json(r#"{ "lens_facing": "Front", "record_audio": false }"#)
        .expect("partial config should parse");

    assert_eq!(config.lens_facing, LensFacing::Front);
    assert!(!config.record_audio);
    assert_eq!(config.display_rotation, Rotation::Deg0);
    assert_eq!(config.jpeg_quality, Config::default().jpeg_quality);
}

#[test]
fn test_config_clamps_jpeg_quality() {
    let config = Config::from_json(r#"{ "jpeg_quality": 0 }"#).expect("config should parse");
    assert_eq!(config.jpeg_quality, 1);
}

#[test]
fn test_config_rejects_invalid_json() {
    assert!(Config::from_json("{ not json").is_err());
}

#[test]
fn test_media_directory_override() {
    let config = Config {
        media_dir: Some(PathBuf::from("/tmp/viewfinder-media")),
        ..Config::default()
    };
    assert_eq!(
        config.media_directory(),
        PathBuf::from("/tmp/viewfinder-media")
    );
}

#[test]
fn test_config_roundtrip_through_file() {
    let dir = std::env::temp_dir().join(format!("viewfinder-config-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");

    let config = Config {
        lens_facing: LensFacing::External,
        bitrate_preset: BitratePreset::High,
        ..Config::default()
    };
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    std::fs::remove_dir_all(&dir).ok();
}
