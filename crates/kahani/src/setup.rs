//! Drivers and speech backend from configuration.

use kahani_config::{ApiKeys, KahaniConfig};
use kahani_core::PipelineStage;
use kahani_error::{KahaniResult, ModelsError, ModelsErrorKind};
use kahani_interface::{KahaniDriver, SpeechSynthesizer};
use kahani_models::{OpenAiSpeech, route_driver};
use kahani_pipeline::StageDrivers;
use std::collections::HashMap;
use std::sync::Arc;

/// Route one driver per stage from the `[models]` section.
///
/// Stages configured with the same model id share a driver.
///
/// # Errors
///
/// Returns an error when a routed provider has no API key.
#[tracing::instrument(skip_all)]
pub fn stage_drivers(config: &KahaniConfig, keys: &ApiKeys) -> KahaniResult<StageDrivers> {
    let mut routed: HashMap<String, Arc<dyn KahaniDriver>> = HashMap::new();
    let mut driver_for = |model: &str| -> KahaniResult<Arc<dyn KahaniDriver>> {
        if let Some(driver) = routed.get(model) {
            return Ok(driver.clone());
        }
        let driver = route_driver(model, keys, config)?;
        tracing::debug!(model, provider = driver.provider_name(), "Driver ready");
        routed.insert(model.to_string(), driver.clone());
        Ok(driver)
    };

    let models = &config.models;
    Ok(StageDrivers {
        outline: driver_for(models.for_stage(PipelineStage::Outline))?,
        characters: driver_for(models.for_stage(PipelineStage::Characters))?,
        plot: driver_for(models.for_stage(PipelineStage::Plot))?,
        consistency: driver_for(models.consistency())?,
        split: driver_for(models.for_stage(PipelineStage::Split))?,
        enhance: driver_for(models.for_stage(PipelineStage::Enhance))?,
        dialogue: driver_for(models.for_stage(PipelineStage::Dialogue))?,
        translate: driver_for(models.for_stage(PipelineStage::Translate))?,
    })
}

/// OpenAI text-to-speech from the `[speech]` section.
///
/// # Errors
///
/// Returns an error when no OpenAI key is available.
pub fn speech_backend(config: &KahaniConfig, keys: &ApiKeys) -> KahaniResult<Arc<dyn SpeechSynthesizer>> {
    let key = keys.openai.clone().ok_or_else(|| {
        ModelsError::new(ModelsErrorKind::MissingApiKey("OPENAI_API_KEY".into()))
    })?;
    Ok(Arc::new(OpenAiSpeech::new(
        key,
        config.providers.openai_base_url.clone(),
        config.speech.clone(),
    )))
}
