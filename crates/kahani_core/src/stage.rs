//! Pipeline stage names.

use serde::{Deserialize, Serialize};

/// One step of the story sequence, in execution order.
///
/// # Examples
///
/// ```
/// use kahani_core::PipelineStage;
///
/// assert_eq!(PipelineStage::Outline.next(), Some(PipelineStage::Characters));
/// assert_eq!(PipelineStage::Finalize.next(), None);
/// assert_eq!(PipelineStage::Split.to_string(), "split");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    /// Topic to outline events
    Outline,
    /// Outline to characters
    Characters,
    /// Plot options, consistency check, selection
    Plot,
    /// Split into episodes
    Split,
    /// Lengthen each episode
    Enhance,
    /// Dialogue script per episode
    Dialogue,
    /// Translate the final story
    Translate,
    /// Text-to-speech per episode
    Narrate,
    /// Persist the run
    Finalize,
}

impl PipelineStage {
    /// The stage that follows this one.
    pub fn next(self) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().skip_while(|s| *s != self).nth(1)
    }

    /// Whether an empty or all-placeholder result from this stage stops the run.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Self::Outline | Self::Characters | Self::Split | Self::Enhance | Self::Dialogue
        )
    }

    /// Whether reviewer feedback can send this stage round again.
    pub fn accepts_feedback(self) -> bool {
        matches!(self, Self::Outline | Self::Characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_stages_run_in_fixed_order() {
        let names: Vec<String> = PipelineStage::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "outline",
                "characters",
                "plot",
                "split",
                "enhance",
                "dialogue",
                "translate",
                "narrate",
                "finalize"
            ]
        );
    }

    #[test]
    fn test_next_walks_the_chain() {
        let mut stage = PipelineStage::Outline;
        let mut count = 1;
        while let Some(next) = stage.next() {
            assert!(next > stage);
            stage = next;
            count += 1;
        }
        assert_eq!(count, 9);
    }
}
