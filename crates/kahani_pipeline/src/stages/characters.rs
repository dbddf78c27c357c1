//! Outline to characters.

use super::Stage;
use crate::prompts;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_error::KahaniResult;
use kahani_extract::story::parse_characters;
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// Develops 3 to 5 characters from the joined outline.
pub struct CharactersStage {
    driver: Arc<dyn KahaniDriver>,
}

impl CharactersStage {
    /// Character stage backed by `driver`.
    pub fn new(driver: Arc<dyn KahaniDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl Stage for CharactersStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Characters
    }

    #[tracing::instrument(skip_all, fields(model = self.driver.model_name(), feedback = feedback.len()))]
    async fn run(&self, state: &mut StoryState, feedback: &[String]) -> KahaniResult<()> {
        let plot = state.outline_text();
        let human = if feedback.is_empty() || state.characters.is_empty() {
            prompts::characters_human(&plot)
        } else {
            prompts::characters_refine_human(&plot, &state.characters, feedback)
        };

        let reply = self.driver.complete(prompts::CHARACTERS_SYSTEM, &human).await?;
        let parsed = parse_characters(&reply.text);

        if parsed.value.is_empty() && !state.characters.is_empty() {
            tracing::warn!("Revised characters could not be parsed, keeping previous characters");
            state.warn("Revised characters could not be parsed; kept the previous characters");
            return Ok(());
        }

        for character in &parsed.value {
            tracing::debug!(name = %character.name(), role = %character.role(), "Character");
        }
        tracing::info!(count = parsed.value.len(), strategy = parsed.strategy, "Characters developed");
        state.characters = parsed.value;
        Ok(())
    }
}
