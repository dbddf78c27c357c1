//! Tests for layered configuration loading.

use kahani_config::{ConfigLayers, KahaniConfig};
use std::io::Write;
use tempfile::Builder;

fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_bundled_defaults() {
    let config = KahaniConfig::bundled().unwrap();

    assert_eq!(config.dispatch.max_concurrency, 10);
    assert_eq!(config.translation.max_chunk_chars, 4000);
    assert_eq!(config.speech.voice, "nova");
    assert_eq!(config.speech.model, "gpt-4o-mini-tts");
    assert_eq!(config.pipeline.max_refinements, 3);
    assert!((config.generation.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.dispatch.requests_per_minute, None);
}

#[test]
fn test_file_overrides_bundled_values() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[dispatch]
max_concurrency = 3
timeout_secs = 60

[models]
default = "llama-3.1-8b-instant"
"#
    )
    .unwrap();

    let config = KahaniConfig::from_file(file.path()).unwrap();

    assert_eq!(config.dispatch.max_concurrency, 3);
    assert_eq!(config.dispatch.timeout_secs, 60);
    assert_eq!(config.models.default, "llama-3.1-8b-instant");
    // Untouched sections keep bundled values
    assert_eq!(config.translation.max_chunk_chars, 4000);
    assert_eq!(config.models.outline.as_deref(), Some("gpt-4o-mini"));
}

#[test]
fn test_env_overrides_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[dispatch]\nmax_concurrency = 3\ntimeout_secs = 60").unwrap();

    let layers = ConfigLayers {
        home_file: Some(file.path().to_path_buf()),
        local_name: None,
        env: Some(env(&[
            ("KAHANI_DISPATCH__MAX_CONCURRENCY", "7"),
            ("KAHANI_PIPELINE__MAX_REFINEMENTS", "1"),
        ])),
    };
    let config = KahaniConfig::load_layers(&layers).unwrap();

    assert_eq!(config.dispatch.max_concurrency, 7);
    assert_eq!(config.dispatch.timeout_secs, 60);
    assert_eq!(config.pipeline.max_refinements, 1);
}

#[test]
fn test_missing_home_file_is_skipped() {
    let layers = ConfigLayers {
        home_file: Some("/nonexistent/kahani/kahani.toml".into()),
        local_name: None,
        env: Some(config::Map::new()),
    };
    assert!(KahaniConfig::load_layers(&layers).is_ok());
}

#[test]
fn test_zero_concurrency_is_rejected() {
    let layers = ConfigLayers {
        env: Some(env(&[("KAHANI_DISPATCH__MAX_CONCURRENCY", "0")])),
        ..Default::default()
    };
    let err = KahaniConfig::load_layers(&layers).unwrap_err();
    assert!(err.to_string().contains("max_concurrency"));
}

#[test]
fn test_from_missing_file_errors() {
    assert!(KahaniConfig::from_file("/nonexistent/kahani.toml").is_err());
}
