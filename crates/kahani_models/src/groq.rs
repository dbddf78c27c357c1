//! Groq LPU inference driver over the OpenAI-compatible endpoint.

use crate::openai_compat::{ClientSettings, OpenAiCompatibleClient};
use async_trait::async_trait;
use kahani_core::{GenerateRequest, GenerateResponse};
use kahani_error::{KahaniResult, ModelsError, ModelsErrorKind, ModelsResult};
use kahani_interface::KahaniDriver;
use tracing::instrument;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq chat completions driver.
#[derive(Debug, Clone)]
pub struct GroqDriver {
    inner: OpenAiCompatibleClient,
}

impl GroqDriver {
    /// Creates a new Groq driver with default settings.
    ///
    /// Reads the API key from `GROQ_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not set.
    #[instrument(skip_all, fields(model = %model))]
    pub fn new(model: String) -> ModelsResult<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| ModelsError::new(ModelsErrorKind::MissingApiKey("GROQ_API_KEY".into())))?;
        let settings = ClientSettings::builder()
            .base_url(GROQ_BASE_URL)
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))?;
        Ok(Self::with_settings(api_key, model, settings))
    }

    /// Creates a driver with an explicit key and settings.
    #[instrument(skip(api_key, settings), fields(model = %model))]
    pub fn with_settings(api_key: String, model: String, settings: ClientSettings) -> Self {
        Self {
            inner: OpenAiCompatibleClient::new(api_key, model, settings, "groq"),
        }
    }
}

#[async_trait]
impl KahaniDriver for GroqDriver {
    #[instrument(skip(self, req), fields(provider = "groq", model = %self.inner.model_name()))]
    async fn generate(&self, req: &GenerateRequest) -> KahaniResult<GenerateResponse> {
        Ok(self.inner.generate(req).await?)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
