//! Pipeline stages.
//!
//! Every stage is a [`Stage`]: it reads what earlier stages left in the
//! [`StoryState`] and writes its own output back. Stage structs hold only
//! configuration and driver handles, so running a stage twice on the same
//! state and feedback sends the same requests.

mod characters;
mod consistency;
mod dialogue;
mod enhance;
mod finalize;
mod narrate;
mod outline;
mod plot;
mod split;
mod translate;

pub use characters::CharactersStage;
pub use consistency::ConsistencyChecker;
pub use dialogue::DialogueStage;
pub use enhance::EnhanceStage;
pub use finalize::FinalizeStage;
pub use narrate::NarrateStage;
pub use outline::OutlineStage;
pub use plot::{PlotStage, auto_select_count};
pub use split::SplitStage;
pub use translate::TranslateStage;

use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_error::{KahaniError, KahaniResult, PipelineError, PipelineErrorKind};

/// One step of the story sequence.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Which step this is.
    fn kind(&self) -> PipelineStage;

    /// Run the stage against `state`.
    ///
    /// `feedback` holds every revision request made so far for this stage,
    /// oldest first; it is empty on the first pass and ignored by stages
    /// that do not accept feedback.
    async fn run(&self, state: &mut StoryState, feedback: &[String]) -> KahaniResult<()>;
}

#[track_caller]
pub(crate) fn stage_failed(stage: PipelineStage, reason: impl Into<String>) -> KahaniError {
    PipelineError::new(PipelineErrorKind::StageFailed {
        stage: stage.to_string(),
        reason: reason.into(),
    })
    .into()
}

#[track_caller]
pub(crate) fn missing_input(stage: PipelineStage, what: impl Into<String>) -> KahaniError {
    PipelineError::new(PipelineErrorKind::MissingInput {
        stage: stage.to_string(),
        what: what.into(),
    })
    .into()
}
