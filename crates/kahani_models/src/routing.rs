//! Model id to provider routing.

use crate::{ClientSettings, GroqDriver, OpenAiDriver};
use kahani_config::{ApiKeys, KahaniConfig};
use kahani_error::{ModelsError, ModelsErrorKind, ModelsResult};
use kahani_interface::KahaniDriver;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Groq model substituted for ids that name no known family.
pub const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";

/// Hosted chat provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// api.openai.com
    OpenAi,
    /// api.groq.com
    Groq,
}

/// Decide provider and effective model id.
///
/// Ids containing `gpt` go to OpenAI unchanged. Everything else goes to
/// Groq; ids naming neither llama nor claude are replaced by
/// [`DEFAULT_GROQ_MODEL`].
///
/// # Examples
///
/// ```
/// use kahani_models::{Provider, resolve_route};
///
/// assert_eq!(resolve_route("gpt-4o-mini"), (Provider::OpenAi, "gpt-4o-mini".to_string()));
/// assert_eq!(resolve_route("llama-3.1-8b-instant"), (Provider::Groq, "llama-3.1-8b-instant".to_string()));
/// assert_eq!(resolve_route("mixtral-8x7b"), (Provider::Groq, "llama3-70b-8192".to_string()));
/// ```
pub fn resolve_route(model: &str) -> (Provider, String) {
    let lower = model.to_lowercase();
    if lower.contains("gpt") {
        (Provider::OpenAi, model.to_string())
    } else if lower.contains("llama") || lower.contains("claude") {
        (Provider::Groq, model.to_string())
    } else {
        (Provider::Groq, DEFAULT_GROQ_MODEL.to_string())
    }
}

/// Build the driver for `model` using `keys` and the configured endpoints
/// and sampling defaults.
///
/// # Errors
///
/// Returns [`ModelsErrorKind::MissingApiKey`] when the routed provider has
/// no key.
#[instrument(skip(keys, config))]
pub fn route_driver(
    model: &str,
    keys: &ApiKeys,
    config: &KahaniConfig,
) -> ModelsResult<Arc<dyn KahaniDriver>> {
    let (provider, model) = resolve_route(model);
    debug!(%provider, model = %model, "Routing model");

    let base_url = match provider {
        Provider::OpenAi => &config.providers.openai_base_url,
        Provider::Groq => &config.providers.groq_base_url,
    };
    let settings = ClientSettings::builder()
        .base_url(base_url.clone())
        .temperature(config.generation.temperature)
        .max_tokens(config.generation.max_tokens)
        .streaming(config.generation.streaming)
        .build()
        .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))?;

    match provider {
        Provider::OpenAi => {
            let key = keys.openai.clone().ok_or_else(|| {
                ModelsError::new(ModelsErrorKind::MissingApiKey("OPENAI_API_KEY".into()))
            })?;
            Ok(Arc::new(OpenAiDriver::with_settings(key, model, settings)))
        }
        Provider::Groq => {
            let key = keys.groq.clone().ok_or_else(|| {
                ModelsError::new(ModelsErrorKind::MissingApiKey("GROQ_API_KEY".into()))
            })?;
            Ok(Arc::new(GroqDriver::with_settings(key, model, settings)))
        }
    }
}
