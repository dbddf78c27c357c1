//! Text-to-speech narration per episode.

use super::Stage;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_dispatch::{DispatchReport, Dispatcher};
use kahani_error::KahaniResult;
use kahani_interface::SpeechSynthesizer;
use std::sync::Arc;

/// Narrates each episode's dialogue, or its text when no dialogue exists.
///
/// Runs only when the request asks for narration. Failures never stop
/// the run.
pub struct NarrateStage {
    synth: Arc<dyn SpeechSynthesizer>,
    dispatcher: Dispatcher,
    voice: Option<String>,
}

impl NarrateStage {
    /// Narrate stage using the synthesizer's default voice.
    pub fn new(synth: Arc<dyn SpeechSynthesizer>, dispatcher: Dispatcher) -> Self {
        Self {
            synth,
            dispatcher,
            voice: None,
        }
    }

    /// Narrate with `voice` instead of the default.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with "...".
pub(crate) fn truncate_for_speech(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[async_trait]
impl Stage for NarrateStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Narrate
    }

    #[tracing::instrument(skip_all, fields(episodes = state.episodes.len()))]
    async fn run(&self, state: &mut StoryState, _feedback: &[String]) -> KahaniResult<()> {
        if !*state.request.narrate() {
            tracing::debug!("Narration not requested");
            return Ok(());
        }

        let max_chars = self.synth.max_input_chars();
        let texts: Vec<(u32, String)> = state
            .episodes
            .iter()
            .map(|e| {
                let text = state
                    .dialogues
                    .get(&e.number)
                    .cloned()
                    .unwrap_or_else(|| state.episode_text(e));
                if text.chars().count() > max_chars {
                    tracing::warn!(episode = e.number, max_chars, "Narration text truncated");
                }
                (e.number, truncate_for_speech(&text, max_chars))
            })
            .collect();

        let synth = &self.synth;
        let voice = self.voice.as_deref();
        let outcomes = self
            .dispatcher
            .run(texts, |_, (number, text)| async move {
                synth.synthesize(&text, voice).await.map(|audio| (number, audio))
            })
            .await;
        DispatchReport::from_outcomes(&outcomes).log("narrate");

        for outcome in outcomes {
            match outcome.result {
                Ok((number, audio)) => {
                    tracing::debug!(episode = number, bytes = audio.len(), "Episode narrated");
                    state.narrations.insert(number, audio);
                }
                Err(e) => {
                    let number = state.episodes.get(outcome.index).map(|ep| ep.number).unwrap_or_default();
                    state.warn(format!("Narration for episode {} failed: {}", number, e.kind));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_speech() {
        assert_eq!(truncate_for_speech("short", 10), "short");
        assert_eq!(truncate_for_speech("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate_for_speech("abcdefghijkl", 8).chars().count(), 8);
    }
}
