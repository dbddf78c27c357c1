//! OpenAI chat driver.

use crate::openai_compat::{ClientSettings, OpenAiCompatibleClient};
use async_trait::async_trait;
use kahani_core::{GenerateRequest, GenerateResponse};
use kahani_error::{KahaniResult, ModelsError, ModelsErrorKind, ModelsResult};
use kahani_interface::KahaniDriver;
use tracing::instrument;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions driver.
#[derive(Debug, Clone)]
pub struct OpenAiDriver {
    inner: OpenAiCompatibleClient,
}

impl OpenAiDriver {
    /// Creates a new OpenAI driver with default settings.
    ///
    /// Reads the API key from `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not set.
    #[instrument(skip_all, fields(model = %model))]
    pub fn new(model: String) -> ModelsResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelsError::new(ModelsErrorKind::MissingApiKey("OPENAI_API_KEY".into())))?;
        let settings = ClientSettings::builder()
            .base_url(OPENAI_BASE_URL)
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))?;
        Ok(Self::with_settings(api_key, model, settings))
    }

    /// Creates a driver with an explicit key and settings.
    #[instrument(skip(api_key, settings), fields(model = %model))]
    pub fn with_settings(api_key: String, model: String, settings: ClientSettings) -> Self {
        Self {
            inner: OpenAiCompatibleClient::new(api_key, model, settings, "openai"),
        }
    }
}

#[async_trait]
impl KahaniDriver for OpenAiDriver {
    #[instrument(skip(self, req), fields(provider = "openai", model = %self.inner.model_name()))]
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
