//! Persist the finished run.

use super::Stage;
use crate::archive::StoryArchive;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_error::KahaniResult;
use std::sync::Arc;

/// Hands the state to a [`StoryArchive`].
pub struct FinalizeStage {
    archive: Arc<dyn StoryArchive>,
}

impl FinalizeStage {
    /// Finalize into `archive`.
    pub fn new(archive: Arc<dyn StoryArchive>) -> Self {
        Self { archive }
    }
}

#[async_trait]
impl Stage for FinalizeStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Finalize
    }

    #[tracing::instrument(skip_all)]
    async fn run(&self, state: &mut StoryState, _feedback: &[String]) -> KahaniResult<()> {
        if !state.warnings.is_empty() {
            tracing::warn!(count = state.warnings.len(), "Run finished with warnings");
        }
        let receipt = self.archive.persist(state).await?;
        tracing::info!(location = %receipt.location(), files = receipt.files().len(), "Run archived");
        Ok(())
    }
}
