//! Per-run story state.

use crate::{Character, ConsistencyIssue, DialogueStyle, EnhancedEpisode, Episode};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the caller asked for.
///
/// # Examples
///
/// ```
/// use kahani_core::StoryRequest;
///
/// let request = StoryRequest::builder()
///     .topic("A haunted hotel")
///     .num_episodes(3u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.story_type(), "general");
/// assert!(request.languages().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct StoryRequest {
    /// Story topic or theme.
    topic: String,
    /// Number of episodes to split the story into.
    #[builder(default = "5")]
    num_episodes: u32,
    /// Genre, e.g. general, ghost, sci-fi, mystery.
    #[builder(default = "\"general\".to_string()")]
    story_type: String,
    /// Dialogue style.
    #[builder(default)]
    style: DialogueStyle,
    /// Target languages for translation.
    #[builder(default)]
    languages: Vec<String>,
    /// Synthesize narration audio per episode.
    #[builder(default)]
    narrate: bool,
    /// Run the consistency checker over the plot options.
    #[builder(default)]
    check_consistency: bool,
}

impl StoryRequest {
    /// Start building a request.
    pub fn builder() -> StoryRequestBuilder {
        StoryRequestBuilder::default()
    }
}

/// Everything a run has produced so far.
///
/// Owned by one run, filled in stage by stage. Per-episode maps are keyed by
/// episode number so serialization order is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryState {
    /// The originating request
    pub request: StoryRequest,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Outline events
    pub outline: Vec<String>,
    /// Candidate plot options
    pub plot_options: Vec<String>,
    /// Plot options came from the built-in library, not the model
    #[serde(default)]
    pub plot_options_synthetic: bool,
    /// Plot options chosen for the split
    pub selected_plots: Vec<String>,
    /// Outline and selected plots joined into one text
    pub detailed_plot: String,
    /// Characters
    pub characters: Vec<Character>,
    /// Split episodes
    pub episodes: Vec<Episode>,
    /// Lengthened episodes by number
    pub enhanced_episodes: BTreeMap<u32, EnhancedEpisode>,
    /// Dialogue scripts by episode number
    pub dialogues: BTreeMap<u32, String>,
    /// Translated final story by language
    pub translations: BTreeMap<String, String>,
    /// Narration audio by episode number
    #[serde(skip)]
    pub narrations: BTreeMap<u32, Vec<u8>>,
    /// Issues reported by the consistency checker
    pub consistency_issues: Vec<ConsistencyIssue>,
    /// Absorbed per-item failures
    pub warnings: Vec<String>,
}

impl StoryState {
    /// Fresh state for `request`.
    pub fn new(request: StoryRequest) -> Self {
        Self {
            request,
            started_at: Utc::now(),
            outline: Vec::new(),
            plot_options: Vec::new(),
            plot_options_synthetic: false,
            selected_plots: Vec::new(),
            detailed_plot: String::new(),
            characters: Vec::new(),
            episodes: Vec::new(),
            enhanced_episodes: BTreeMap::new(),
            dialogues: BTreeMap::new(),
            translations: BTreeMap::new(),
            narrations: BTreeMap::new(),
            consistency_issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Outline events joined into one paragraph.
    pub fn outline_text(&self) -> String {
        self.outline.join(" ")
    }

    /// Lengthened text for an episode, or its outline content.
    pub fn episode_text(&self, episode: &Episode) -> String {
        self.enhanced_episodes
            .get(&episode.number)
            .map(|e| e.content().clone())
            .unwrap_or_else(|| episode.content.clone())
    }

    /// Record an absorbed failure.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Directory name for this run: first 30 characters of the topic with
    /// non-alphanumerics replaced by `_`, then the start timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use kahani_core::{StoryRequest, StoryState};
    ///
    /// let request = StoryRequest::builder().topic("A haunted hotel!").build().unwrap();
    /// let state = StoryState::new(request);
    /// assert!(state.slug().starts_with("A_haunted_hotel__"));
    /// ```
    pub fn slug(&self) -> String {
        let title: String = self
            .request
            .topic()
            .chars()
            .take(30)
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_{}", title, self.started_at.format("%Y%m%d_%H%M%S"))
    }

    /// Story markdown with outline, characters, episodes, dialogue and
    /// cliffhangers.
    pub fn details_markdown(&self) -> String {
        let mut out = format!("# {}\n\n## Story Outline\n", self.request.topic());
        for (i, event) in self.outline.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, event));
        }
        out.push_str("\n## Characters\n");
        for c in &self.characters {
            out.push_str(&format!(
                "### {} ({})\n{}\n\n",
                c.name(),
                c.role(),
                c.description()
            ));
        }
        out.push_str("## Episodes\n");
        for episode in &self.episodes {
            out.push_str(&format!(
                "### Episode {}: {}\n\n{}\n\n",
                episode.number,
                episode.title,
                self.episode_text(episode)
            ));
            if let Some(dialogue) = self.dialogues.get(&episode.number) {
                out.push_str(&format!("## Dialogue\n{}\n\n", dialogue));
            }
            if !episode.cliffhanger.is_empty() {
                out.push_str(&format!("**Cliffhanger:** {}\n\n", episode.cliffhanger));
            }
        }
        out
    }

    /// The reader-facing final story: introduction, characters and the
    /// dialogue script of every episode.
    pub fn final_story_markdown(&self) -> String {
        let mut out = format!(
            "# {}\n\n## Introduction\n\n{}\n\n## Characters\n\n",
            self.request.topic(),
            self.outline_text()
        );
        for c in &self.characters {
            out.push_str(&format!(
                "**{}** ({}): {}\n\n",
                c.name(),
                c.role(),
                c.description()
            ));
        }
        out.push_str("## Story\n\n");
        let total = self.episodes.len() as u32;
        for episode in &self.episodes {
            if let Some(dialogue) = self.dialogues.get(&episode.number) {
                out.push_str(&format!(
                    "### Episode {}: {}\n\n{}\n\n",
                    episode.number, episode.title, dialogue
                ));
                if episode.number < total {
                    out.push_str("---\n\n");
                }
            }
        }
        out.push_str(&format!(
            "\n\n*Generated on {}*\n",
            self.started_at.format("%Y-%m-%d")
        ));
        out
    }
}
