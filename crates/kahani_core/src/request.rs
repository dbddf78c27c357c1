//! Request and response types for model generation.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Generic chat generation request.
///
/// # Examples
///
/// ```
/// use kahani_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::system("You outline stories."), Message::user("Haunted hotel")])
///     .temperature(0.7)
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 2);
/// assert_eq!(request.max_tokens, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder)]
#[builder(setter(into, strip_option), default)]
pub struct GenerateRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Model identifier to use, overriding the driver default
    pub model: Option<String>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// One piece of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output.
    Text(String),

    /// Synthesized audio.
    Audio {
        /// MIME type of the audio
        mime: Option<String>,
        /// Encoded audio bytes
        data: Vec<u8>,
    },
}

/// The unified response object.
///
/// # Examples
///
/// ```
/// use kahani_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![Output::Text("Once upon a time".to_string())],
/// };
///
/// assert_eq!(response.text(), "Once upon a time");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenated text of all text outputs.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Provider-independent model reply: just the text.
///
/// Stages consume this and nothing else, so no stage has to know which
/// provider answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ModelResponse {
    /// Raw reply text
    pub text: String,
}

impl From<GenerateResponse> for ModelResponse {
    fn from(response: GenerateResponse) -> Self {
        Self {
            text: response.text(),
        }
    }
}
