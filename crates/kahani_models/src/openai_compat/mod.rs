//! Shared client for OpenAI-compatible chat completion endpoints.

mod dto;
mod stream;

pub use dto::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

use derive_getters::Getters;
use futures_util::StreamExt;
use kahani_core::{GenerateRequest, GenerateResponse, Output};
use kahani_error::{ModelsError, ModelsErrorKind, ModelsResult, RetryableError};
use reqwest::Client;
use std::time::Duration;
use stream::{StreamLine, parse_stream_line};
use tokio_retry2::{
    Retry, RetryError,
    strategy::{ExponentialBackoff, jitter},
};
use tracing::{debug, info, instrument, warn};

/// Sampling and endpoint settings for one client.
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ClientSettings {
    /// API base URL, without the `/chat/completions` suffix.
    base_url: String,
    /// Default sampling temperature.
    #[builder(default = "0.7")]
    temperature: f32,
    /// Default generated token cap.
    #[builder(default)]
    max_tokens: Option<u32>,
    /// Request server-sent event streaming.
    #[builder(default)]
    streaming: bool,
}

impl ClientSettings {
    /// Start building settings.
    pub fn builder() -> ClientSettingsBuilder {
        ClientSettingsBuilder::default()
    }
}

/// OpenAI-compatible chat client.
///
/// Request fields left unset fall back to the client settings.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    api_key: String,
    model: String,
    settings: ClientSettings,
    provider: &'static str,
}

impl OpenAiCompatibleClient {
    /// Create a client for `provider` talking to `settings.base_url`.
    pub fn new(
        api_key: String,
        model: String,
        settings: ClientSettings,
        provider: &'static str,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            settings,
            provider,
        }
    }

    /// Provider name.
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }

    /// Default model id.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Client settings.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    /// Build the wire request, filling unset fields from the settings.
    pub fn build_body(&self, req: &GenerateRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: req.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: req.messages.iter().map(ChatMessage::from).collect(),
            temperature: req.temperature.or(Some(self.settings.temperature)),
            max_tokens: req.max_tokens.or(self.settings.max_tokens),
            stream: self.settings.streaming,
        }
    }

    /// Send a chat request, retrying transient failures with exponential backoff.
    #[instrument(skip(self, req), fields(provider = self.provider, model = %self.model))]
    pub async fn generate(&self, req: &GenerateRequest) -> ModelsResult<GenerateResponse> {
        let body = self.build_body(req);

        let first_error = match self.send(&body).await {
            Ok(response) => return Ok(response),
            Err(e) if !e.is_retryable() => {
                warn!(error = %e, "Permanent API error, failing immediately");
                return Err(e);
            }
            Err(e) => e,
        };

        let (initial_ms, retries, max_delay_secs) = first_error.retry_strategy_params();
        info!(
            error = %first_error,
            initial_backoff_ms = initial_ms,
            max_retries = retries,
            max_delay_secs,
            "Request failed, will retry with configured strategy"
        );

        let retry_strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(retries);

        let body = &body;
        Retry::spawn(retry_strategy, || async move {
            match self.send(body).await {
                Ok(response) => Ok(response),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Transient API error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent API error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }

    async fn send(&self, body: &ChatCompletionRequest) -> ModelsResult<GenerateResponse> {
        debug!(
            endpoint = %self.endpoint(),
            messages = body.messages.len(),
            stream = body.stream,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ModelsError::new(ModelsErrorKind::Http(format!("Request failed: {}", e))))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelsError::new(ModelsErrorKind::from_status(
                status.as_u16(),
                message,
            )));
        }

        let text = if body.stream {
            collect_stream(response).await?
        } else {
            let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
                ModelsError::new(ModelsErrorKind::ResponseParsing(format!(
                    "Failed to parse response: {}",
                    e
                )))
            })?;
            parsed.into_text()?
        };

        debug!(chars = text.len(), "Chat completion received");
        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }
}

async fn collect_stream(response: reqwest::Response) -> ModelsResult<String> {
    let mut bytes = response.bytes_stream();
    let mut pending: Vec<u8> = Vec::new();
    let mut text = String::new();

    'outer: while let Some(chunk) = bytes.next().await {
        let chunk = chunk
            .map_err(|e| ModelsError::new(ModelsErrorKind::Http(format!("Stream interrupted: {}", e))))?;
        pending.extend_from_slice(&chunk);

        while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            match parse_stream_line(&line)? {
                StreamLine::Content(delta) => text.push_str(&delta),
                StreamLine::Done => break 'outer,
                StreamLine::Skip => {}
            }
        }
    }

    Ok(text)
}
