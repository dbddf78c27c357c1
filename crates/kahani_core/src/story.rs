//! Story records produced by the pipeline stages.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A story character.
///
/// # Examples
///
/// ```
/// use kahani_core::Character;
///
/// let alice = Character::new("Alice", "A determined detective", "Protagonist");
/// assert_eq!(alice.name(), "Alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
pub struct Character {
    /// Character name.
    name: String,
    /// Physical and psychological description.
    description: String,
    /// Role in the plot.
    role: String,
}

impl Character {
    /// Create a character.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            role: role.into(),
        }
    }
}

/// One episode of the split story.
///
/// Every episode except the last carries a cliffhanger; the last one's is
/// always empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// 1-based sequence number
    pub number: u32,
    /// Short title
    pub title: String,
    /// Episode narrative outline
    pub content: String,
    /// Closing hook, empty for the final episode
    #[serde(default)]
    pub cliffhanger: String,
    /// Placeholder slot padded in when the model returned too few episodes
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

/// Lengthened narrative for one episode.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct EnhancedEpisode {
    /// Episode number this expands.
    number: u32,
    /// Episode title.
    title: String,
    /// The lengthened narrative.
    content: String,
    /// Whitespace-separated word count of `content`.
    word_count: usize,
}

impl EnhancedEpisode {
    /// Wrap lengthened content, counting its words.
    pub fn new(number: u32, title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        Self {
            number,
            title: title.into(),
            content,
            word_count,
        }
    }
}

/// A detected inconsistency between the outline and the plot options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    /// 0-based index into the plot options, if the issue is tied to one
    pub plot_option_index: Option<usize>,
    /// Text of the affected plot option
    pub plot_option_text: Option<String>,
    /// Kind of inconsistency, e.g. "timeline contradiction"
    pub issue_type: String,
    /// Free-form severity: critical, warning, minor
    pub severity: String,
    /// Why it is inconsistent
    pub description: String,
    /// Possible fixes
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Stand-in issue produced when the checker reply could not be parsed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl ConsistencyIssue {
    /// True when the severity reads "critical".
    pub fn is_critical(&self) -> bool {
        self.severity.trim().eq_ignore_ascii_case("critical")
    }
}

/// How dialogue scripts are written.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DialogueStyle {
    /// Prominent narrator voice alongside character lines
    #[default]
    Novel,
    /// Dialogue-heavy with minimal narration
    Drama,
}
