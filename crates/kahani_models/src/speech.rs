//! OpenAI text-to-speech.

use async_trait::async_trait;
use kahani_config::SpeechConfig;
use kahani_error::{KahaniResult, ModelsError, ModelsErrorKind, ModelsResult, RetryableError};
use kahani_interface::SpeechSynthesizer;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio_retry2::{
    Retry, RetryError,
    strategy::{ExponentialBackoff, jitter},
};
use tracing::{debug, instrument, warn};

const SPEECH_INSTRUCTIONS: &str = "Speak in a natural and engaging tone.";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    instructions: &'a str,
}

/// Text-to-speech through `POST {base}/audio/speech`.
#[derive(Debug, Clone)]
pub struct OpenAiSpeech {
    client: Client,
    api_key: String,
    base_url: String,
    config: SpeechConfig,
}

impl OpenAiSpeech {
    /// Create a speech client.
    pub fn new(api_key: String, base_url: String, config: SpeechConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/speech", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, text: &str, voice: &str) -> ModelsResult<Vec<u8>> {
        let body = SpeechRequest {
            model: &self.config.model,
            input: text,
            voice,
            response_format: &self.config.format,
            instructions: SPEECH_INSTRUCTIONS,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
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

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ModelsError::new(ModelsErrorKind::Http(format!("Body read failed: {}", e))))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    #[instrument(skip(self, text), fields(model = %self.config.model, chars = text.chars().count()))]
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> KahaniResult<Vec<u8>> {
        let voice = voice.unwrap_or(&self.config.voice);
        let (initial_ms, retries, max_delay_secs) = (2000, 3, 30);
        let strategy = ExponentialBackoff::from_millis(initial_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(retries);

        let audio = Retry::spawn(strategy, || async move {
            match self.send(text, voice).await {
                Ok(audio) => Ok(audio),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Speech request failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await?;

        debug!(bytes = audio.len(), voice, "Speech synthesized");
        Ok(audio)
    }

    fn default_voice(&self) -> &str {
        &self.config.voice
    }

    fn audio_extension(&self) -> &'static str {
        match self.config.format.as_str() {
            "wav" => "wav",
            "opus" => "opus",
            "aac" => "aac",
            "flac" => "flac",
            "pcm" => "pcm",
            _ => "mp3",
        }
    }

    fn max_input_chars(&self) -> usize {
        self.config.max_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kahani_config::KahaniConfig;

    #[test]
    fn test_defaults_from_bundled_config() {
        let config = KahaniConfig::bundled().unwrap();
        let speech = OpenAiSpeech::new(
            "sk-test".into(),
            config.providers.openai_base_url.clone(),
            config.speech.clone(),
        );
        assert_eq!(speech.default_voice(), "nova");
        assert_eq!(speech.audio_extension(), "mp3");
        assert_eq!(speech.max_input_chars(), 4000);
        assert_eq!(speech.endpoint(), "https://api.openai.com/v1/audio/speech");
    }

    #[test]
    fn test_request_body_shape() {
        let body = SpeechRequest {
            model: "gpt-4o-mini-tts",
            input: "Hello",
            voice: "nova",
            response_format: "mp3",
            instructions: SPEECH_INSTRUCTIONS,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["voice"], "nova");
        assert_eq!(json["response_format"], "mp3");
    }
}
