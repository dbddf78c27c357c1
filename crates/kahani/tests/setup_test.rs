//! Driver wiring from configuration.

use kahani::{ApiKeys, KahaniConfig, KahaniErrorKind, speech_backend, stage_drivers};

fn keys(openai: Option<&str>, groq: Option<&str>) -> ApiKeys {
    ApiKeys {
        openai: openai.map(str::to_string),
        groq: groq.map(str::to_string),
    }
}

#[test]
fn test_stage_drivers_route_by_model() {
    let config = KahaniConfig::bundled().unwrap();
    let drivers = stage_drivers(&config, &keys(Some("sk-test"), Some("gsk-test"))).unwrap();

    assert_eq!(drivers.outline.provider_name(), "openai");
    assert_eq!(drivers.outline.model_name(), config.models.for_stage(kahani::PipelineStage::Outline));
    assert_eq!(drivers.plot.provider_name(), "groq");
    assert_eq!(drivers.split.model_name(), "llama3-70b-8192");
}

#[test]
fn test_stage_drivers_need_keys() {
    let config = KahaniConfig::bundled().unwrap();
    let err = stage_drivers(&config, &keys(Some("sk-test"), None)).err().unwrap();
    assert!(matches!(err.kind(), KahaniErrorKind::Models(_)));
    assert!(err.to_string().contains("GROQ_API_KEY"));
}

#[test]
fn test_speech_backend_needs_openai_key() {
    let config = KahaniConfig::bundled().unwrap();
    assert!(speech_backend(&config, &keys(None, Some("gsk-test"))).is_err());

    let speech = speech_backend(&config, &keys(Some("sk-test"), None)).unwrap();
    assert_eq!(speech.default_voice(), config.speech.voice);
}
