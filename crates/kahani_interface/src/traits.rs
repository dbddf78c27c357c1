//! Backend traits.

use async_trait::async_trait;
use kahani_core::{GenerateRequest, GenerateResponse, Message, ModelResponse};
use kahani_error::KahaniResult;

/// Core trait that all chat model backends implement.
#[async_trait]
pub trait KahaniDriver: Send + Sync {
    /// Generate model output for a chat request.
    async fn generate(&self, req: &GenerateRequest) -> KahaniResult<GenerateResponse>;

    /// Provider name (e.g., "openai", "groq").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "llama3-70b-8192").
    fn model_name(&self) -> &str;

    /// Send one system prompt and one human message, return the reply text.
    ///
    /// Sampling settings come from the driver's own defaults.
    async fn complete(&self, system: &str, human: &str) -> KahaniResult<ModelResponse> {
        let req = GenerateRequest {
            messages: vec![Message::system(system), Message::user(human)],
            ..Default::default()
        };
        let response = self.generate(&req).await?;
        tracing::debug!(
            provider = self.provider_name(),
            model = self.model_name(),
            "Completion received"
        );
        Ok(ModelResponse::from(response))
    }
}

/// Text-to-speech backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice` (or the backend default) into encoded audio.
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> KahaniResult<Vec<u8>>;

    /// Voice used when none is given.
    fn default_voice(&self) -> &str;

    /// File extension of the produced audio.
    fn audio_extension(&self) -> &'static str {
        "mp3"
    }

    /// Longest input the backend accepts, in characters.
    fn max_input_chars(&self) -> usize {
        4000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kahani_core::{Output, Role};
    use std::sync::Mutex;

    struct EchoDriver {
        seen: Mutex<Vec<GenerateRequest>>,
    }

    #[async_trait]
    impl KahaniDriver for EchoDriver {
        async fn generate(&self, req: &GenerateRequest) -> KahaniResult<GenerateResponse> {
            self.seen.lock().unwrap().push(req.clone());
            let last = req.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(GenerateResponse {
                outputs: vec![Output::Text(format!("echo: {}", last))],
            })
        }

        fn provider_name(&self) -> &'static str {
            "echo"
        }

        fn model_name(&self) -> &str {
            "echo-1"
        }
    }

    #[tokio::test]
    async fn test_complete_sends_system_then_user() {
        let driver = EchoDriver {
            seen: Mutex::new(Vec::new()),
        };
        let reply = driver.complete("Be brief.", "Hello").await.unwrap();
        assert_eq!(reply.text, "echo: Hello");

        let seen = driver.seen.lock().unwrap();
        let roles: Vec<Role> = seen[0].messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert_eq!(seen[0].temperature, None);
    }
}
