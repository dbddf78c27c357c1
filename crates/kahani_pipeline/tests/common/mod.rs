//! Scripted drivers shared by the pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use kahani_core::{GenerateRequest, GenerateResponse, Output, Role};
use kahani_error::{HttpError, KahaniResult};
use kahani_interface::{KahaniDriver, SpeechSynthesizer};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Which stage a request belongs to, read off its system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Outline,
    Characters,
    PlotOptions,
    Consistency,
    Improve,
    Split,
    Enhance,
    Dialogue,
    Translate,
}

impl Call {
    fn classify(system: &str) -> Option<Self> {
        let table = [
            ("story outlines", Call::Outline),
            ("story characters", Call::Characters),
            ("proposes plot", Call::PlotOptions),
            ("narrative consistency", Call::Consistency),
            ("repairs inconsistent", Call::Improve),
            ("Split a long narrative", Call::Split),
            ("rich, detailed", Call::Enhance),
            ("dialogue scripts", Call::Dialogue),
            ("literary translator", Call::Translate),
        ];
        table
            .into_iter()
            .find(|(needle, _)| system.contains(needle))
            .map(|(_, call)| call)
    }
}

/// Answers every stage with well-formed replies for `episodes` episodes.
pub struct StoryDriver {
    pub episodes: usize,
    /// Split reply override, e.g. gibberish.
    pub split_reply: Option<String>,
    /// Episode numbers whose enhancement call fails.
    pub failing_enhance: Vec<u32>,
    /// Languages whose translation calls all fail.
    pub failing_translate: Vec<String>,
    pub calls: Mutex<Vec<(Call, String)>>,
    consistency_checks: AtomicUsize,
}

impl StoryDriver {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            split_reply: None,
            failing_enhance: Vec::new(),
            failing_translate: Vec::new(),
            calls: Mutex::new(Vec::new()),
            consistency_checks: AtomicUsize::new(0),
        }
    }

    pub fn humans(&self, call: Call) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == call)
            .map(|(_, human)| human.clone())
            .collect()
    }

    fn reply(&self, call: Call, human: &str) -> KahaniResult<String> {
        let text = match call {
            Call::Outline => r#"{"events": ["A storm cuts off the island", "The keeper finds a stranger on the rocks", "The lamp fails at midnight", "The stranger's ship is found empty", "The keeper relights the lamp"]}"#.to_string(),
            Call::Characters => r#"{"characters": [
                {"name": "Mara", "description": "Weathered lighthouse keeper", "role": "Protagonist"},
                {"name": "Ilse", "description": "Soaked stranger with no memory", "role": "Mystery"},
                {"name": "Tomas", "description": "Supply boat captain", "role": "Ally"}
            ]}"#
            .to_string(),
            Call::PlotOptions => {
                let options: Vec<String> = (1..=10)
                    .map(|i| format!("Plot option number {} where the tide reveals a secret", i))
                    .collect();
                serde_json::to_string(&options).unwrap()
            }
            Call::Consistency => {
                if self.consistency_checks.fetch_add(1, Ordering::SeqCst) == 0 {
                    r#"[{"plot_option_index": 1, "issue_type": "Timeline", "severity": "critical", "description": "Happens before the storm arrives"}]"#.to_string()
                } else {
                    "No inconsistencies found.".to_string()
                }
            }
            Call::Improve => "1. The tide reveals the diary only after the storm has passed".to_string(),
            Call::Split => match &self.split_reply {
                Some(reply) => reply.clone(),
                None => {
                    let episodes: Vec<serde_json::Value> = (1..=self.episodes)
                        .map(|n| {
                            serde_json::json!({
                                "number": n,
                                "title": format!("Night {}", n),
                                "content": format!("Events of night {}.", n),
                                "cliffhanger": format!("Something stirs after night {}.", n),
                            })
                        })
                        .collect();
                    serde_json::json!({ "episodes": episodes }).to_string()
                }
            },
            Call::Enhance => {
                for n in &self.failing_enhance {
                    if human.contains(&format!("Episode Number: {}\n", n)) {
                        return Err(HttpError::new("connection reset").into());
                    }
                }
                "The wind rose over the island and the long night began.".to_string()
            }
            Call::Dialogue => "NARRATOR: The lamp flickers.\nMARA: Not tonight.".to_string(),
            Call::Translate => {
                for language in &self.failing_translate {
                    if human.starts_with(&format!("Translate the following text to {}.", language)) {
                        return Err(HttpError::new("rate limited").into());
                    }
                }
                format!("TRANSLATED {}", human.len())
            }
        };
        Ok(text)
    }
}

#[async_trait]
impl KahaniDriver for StoryDriver {
    async fn generate(&self, req: &GenerateRequest) -> KahaniResult<GenerateResponse> {
        let system = req
            .messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let human = req
            .messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let call = Call::classify(&system).expect("unrecognised system prompt");
        self.calls.lock().unwrap().push((call, human.clone()));
        let text = self.reply(call, &human)?;
        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

/// Returns the text length as bytes of "audio".
pub struct CountingSpeech {
    pub voices: Mutex<Vec<Option<String>>>,
}

impl CountingSpeech {
    pub fn new() -> Self {
        Self {
            voices: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for CountingSpeech {
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> KahaniResult<Vec<u8>> {
        self.voices.lock().unwrap().push(voice.map(str::to_string));
        Ok(text.as_bytes().to_vec())
    }

    fn default_voice(&self) -> &str {
        "test"
    }
}
