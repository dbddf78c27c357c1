//! Outline, plot points and characters into numbered episodes.

use super::{Stage, missing_input};
use crate::prompts;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_error::KahaniResult;
use kahani_extract::story::parse_episodes;
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// Splits the selected plot into the requested number of episodes.
pub struct SplitStage {
    driver: Arc<dyn KahaniDriver>,
}

impl SplitStage {
    /// Split stage backed by `driver`.
    pub fn new(driver: Arc<dyn KahaniDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Stage for SplitStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Split
    }

    #[tracing::instrument(skip_all, fields(model = self.driver.model_name()))]
    async fn run(&self, state: &mut StoryState, _feedback: &[String]) -> KahaniResult<()> {
        if state.outline.is_empty() && state.detailed_plot.is_empty() {
            return Err(missing_input(PipelineStage::Split, "outline"));
        }
        let requested = *state.request.num_episodes();
        let outline = if state.detailed_plot.is_empty() {
            state.outline_text()
        } else {
            state.detailed_plot.clone()
        };
        let human = prompts::split_human(requested, &outline, &state.selected_plots, &state.characters);

        let reply = self.driver.complete(prompts::SPLIT_SYSTEM, &human).await?;
        let parsed = parse_episodes(&reply.text, requested as usize);

        let padded = parsed.value.iter().filter(|e| e.synthetic).count();
        if padded > 0 {
            state.warn(format!(
                "{} of {} episodes could not be parsed and were replaced with placeholders",
                padded, requested
            ));
        }

        tracing::info!(
            episodes = parsed.value.len(),
            padded,
            strategy = parsed.strategy,
            "Story split into episodes"
        );
        state.episodes = parsed.value;
        Ok(())
    }
}
