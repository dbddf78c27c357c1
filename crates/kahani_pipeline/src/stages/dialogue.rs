//! Dialogue script for every episode.

use super::{Stage, stage_failed};
use crate::prompts;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_dispatch::{DispatchReport, Dispatcher};
use kahani_error::KahaniResult;
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// Writes a dialogue script per episode in the requested style.
pub struct DialogueStage {
    driver: Arc<dyn KahaniDriver>,
    dispatcher: Dispatcher,
}

impl DialogueStage {
    /// Dialogue stage backed by `driver`, fanning out through `dispatcher`.
    pub fn new(driver: Arc<dyn KahaniDriver>, dispatcher: Dispatcher) -> Self {
        Self { driver, dispatcher }
    }
}

#[async_trait]
impl Stage for DialogueStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Dialogue
    }

    #[tracing::instrument(skip_all, fields(model = self.driver.model_name(), style = %state.request.style()))]
    async fn run(&self, state: &mut StoryState, _feedback: &[String]) -> KahaniResult<()> {
        let style = *state.request.style();
        let story_type = state.request.story_type().clone();
        let requests: Vec<String> = state
            .episodes
            .iter()
            .map(|e| prompts::dialogue_human(style, &story_type, &state.episode_text(e), &state.characters))
            .collect();

        let driver = &self.driver;
        let outcomes = self
            .dispatcher
            .run(requests, |_, human| async move {
                driver
                    .complete(prompts::DIALOGUE_SYSTEM, &human)
                    .await
                    .map(|reply| reply.text)
            })
            .await;

        let report = DispatchReport::from_outcomes(&outcomes);
        report.log("dialogue");
        if report.all_failed() {
            return Err(stage_failed(
                PipelineStage::Dialogue,
                format!("every dialogue script failed ({} attempted)", report.total()),
            ));
        }

        for outcome in outcomes {
            let Some(number) = state.episodes.get(outcome.index).map(|e| e.number) else {
                continue;
            };
            let script = match outcome.result {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    state.warn(format!("Dialogue for episode {} failed: {}", number, e.kind));
                    format!("Dialogue for episode {} could not be generated.", number)
                }
            };
            state.dialogues.insert(number, script);
        }

        tracing::info!(scripts = state.dialogues.len(), "Dialogue generated");
        Ok(())
    }
}
