//! Reviewer feedback for the outline and character stages.

use kahani_core::PipelineStage;
use std::collections::HashMap;

/// A reviewer's verdict on a stage's latest output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Move on to the next stage
    Accept,
    /// Re-run the stage with this additional feedback
    Revise(String),
}

/// Source of feedback consulted after refinable stages.
///
/// `round` counts revisions already applied to the stage, starting at 0.
pub trait FeedbackSource: Send + Sync {
    /// Verdict on the stage output after `round` revisions.
    fn review(&self, stage: PipelineStage, round: usize) -> Feedback;
}

/// Accepts every draft.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl FeedbackSource for AcceptAll {
    fn review(&self, _stage: PipelineStage, _round: usize) -> Feedback {
        Feedback::Accept
    }
}

/// Replays a fixed list of revision requests per stage, then accepts.
///
/// ```
/// use kahani_core::PipelineStage;
/// use kahani_pipeline::{Feedback, FeedbackSource, ScriptedFeedback};
///
/// let feedback = ScriptedFeedback::new().with(PipelineStage::Outline, ["Add a storm"]);
/// assert_eq!(
///     feedback.review(PipelineStage::Outline, 0),
///     Feedback::Revise("Add a storm".into())
/// );
/// assert_eq!(feedback.review(PipelineStage::Outline, 1), Feedback::Accept);
/// assert_eq!(feedback.review(PipelineStage::Characters, 0), Feedback::Accept);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeedback {
    scripts: HashMap<PipelineStage, Vec<String>>,
}

impl ScriptedFeedback {
    /// No scripted revisions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add revision requests for `stage`, applied in order.
    pub fn with<I, S>(mut self, stage: PipelineStage, revisions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts
            .entry(stage)
            .or_default()
            .extend(revisions.into_iter().map(Into::into));
        self
    }
}

impl FeedbackSource for ScriptedFeedback {
    fn review(&self, stage: PipelineStage, round: usize) -> Feedback {
        self.scripts
            .get(&stage)
            .and_then(|script| script.get(round))
            .map(|text| Feedback::Revise(text.clone()))
            .unwrap_or(Feedback::Accept)
    }
}
