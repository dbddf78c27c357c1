//! Topic to outline events.

use super::Stage;
use crate::prompts;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_error::KahaniResult;
use kahani_extract::story::parse_outline_events;
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// Generates the outline, and revises it when given feedback.
pub struct OutlineStage {
    driver: Arc<dyn KahaniDriver>,
}

impl OutlineStage {
    /// Outline stage backed by `driver`.
    pub fn new(driver: Arc<dyn KahaniDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Stage for OutlineStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Outline
    }

    #[tracing::instrument(skip_all, fields(model = self.driver.model_name(), feedback = feedback.len()))]
    async fn run(&self, state: &mut StoryState, feedback: &[String]) -> KahaniResult<()> {
        let topic = state.request.topic().clone();
        let human = if feedback.is_empty() || state.outline.is_empty() {
            prompts::outline_human(&topic)
        } else {
            prompts::outline_refine_human(&topic, &state.outline, feedback)
        };

        let reply = self.driver.complete(prompts::OUTLINE_SYSTEM, &human).await?;
        let parsed = parse_outline_events(&reply.text);

        if parsed.value.is_empty() && !state.outline.is_empty() {
            tracing::warn!("Revised outline could not be parsed, keeping previous outline");
            state.warn("Revised outline could not be parsed; kept the previous outline");
            return Ok(());
        }

        tracing::info!(events = parsed.value.len(), strategy = parsed.strategy, "Outline generated");
        state.outline = parsed.value;
        Ok(())
    }
}
