//! Lengthen every episode in parallel, in continuity.

use super::{Stage, missing_input, stage_failed};
use crate::context::build_contexts;
use crate::prompts;
use async_trait::async_trait;
use kahani_core::{EnhancedEpisode, PipelineStage, StoryState};
use kahani_dispatch::{DispatchReport, Dispatcher};
use kahani_error::KahaniResult;
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// Expands each episode outline into a long narrative.
///
/// Contexts are built in episode order first; the model calls then fan
/// out through the dispatcher. An episode whose call fails keeps its
/// outline text and the run records a warning.
pub struct EnhanceStage {
    driver: Arc<dyn KahaniDriver>,
    dispatcher: Dispatcher,
}

impl EnhanceStage {
    /// Enhance stage backed by `driver`, fanning out through `dispatcher`.
    pub fn new(driver: Arc<dyn KahaniDriver>, dispatcher: Dispatcher) -> Self {
        Self { driver, dispatcher }
    }
}

#[async_trait]
impl Stage for EnhanceStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Enhance
    }

    #[tracing::instrument(skip_all, fields(model = self.driver.model_name(), episodes = state.episodes.len()))]
    async fn run(&self, state: &mut StoryState, _feedback: &[String]) -> KahaniResult<()> {
        if state.episodes.is_empty() {
            return Err(missing_input(PipelineStage::Enhance, "episodes"));
        }
        let characters = prompts::characters_block(&state.characters);
        let contexts = build_contexts(&state.episodes, &characters);

        let driver = &self.driver;
        let outcomes = self
            .dispatcher
            .run(contexts, |_, ctx| async move {
                let human = prompts::enhance_human(&ctx);
                driver
                    .complete(prompts::ENHANCE_SYSTEM, &human)
                    .await
                    .map(|reply| reply.text)
            })
            .await;

        let report = DispatchReport::from_outcomes(&outcomes);
        report.log("enhance");
        if report.all_failed() {
            return Err(stage_failed(
                PipelineStage::Enhance,
                format!("every episode failed to enhance ({} attempted)", report.total()),
            ));
        }

        for outcome in outcomes {
            let Some(episode) = state.episodes.get(outcome.index) else {
                continue;
            };
            let (number, title) = (episode.number, episode.title.clone());
            match outcome.result {
                Ok(text) if !text.trim().is_empty() => {
                    let enhanced = EnhancedEpisode::new(number, title, text.trim());
                    tracing::debug!(episode = number, words = enhanced.word_count(), "Episode enhanced");
                    state.enhanced_episodes.insert(number, enhanced);
                }
                Ok(_) => state.warn(format!(
                    "Episode {} enhancement came back empty; using its outline",
                    number
                )),
                Err(e) => state.warn(format!(
                    "Episode {} enhancement failed; using its outline: {}",
                    number, e.kind
                )),
            }
        }

        tracing::info!(
            enhanced = state.enhanced_episodes.len(),
            total = state.episodes.len(),
            "Episodes enhanced"
        );
        Ok(())
    }
}
