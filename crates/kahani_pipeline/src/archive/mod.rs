//! Persistence of finished story runs.
//!
//! Both backends store the same set of artifacts, rendered once by
//! [`render_artifacts`]:
//!
//! ```text
//! {slug}/
//! ├── story.json
//! ├── story_details.md
//! ├── final_story.md
//! ├── final_story_{language}.md
//! ├── episodes/Episode_{n}_{title}.md
//! ├── dialogue/dialogue_episode_{n}.md
//! └── narration/episode_{n}.{ext}
//! ```

mod filesystem;
mod memory;

pub use filesystem::FilesystemArchive;
pub use memory::InMemoryArchive;

use async_trait::async_trait;
use derive_getters::Getters;
use kahani_core::StoryState;
use kahani_error::{KahaniResult, StorageError, StorageErrorKind};

/// Where a run was stored and which files it produced.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ArchiveReceipt {
    /// Backend-specific location of the run, e.g. its directory.
    location: String,
    /// Artifact paths relative to `location`, in write order.
    files: Vec<String>,
}

impl ArchiveReceipt {
    /// Receipt for a run stored at `location`.
    pub fn new(location: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            location: location.into(),
            files,
        }
    }
}

/// Storage backend for finished runs.
#[async_trait]
pub trait StoryArchive: Send + Sync {
    /// Store every artifact of `state`.
    async fn persist(&self, state: &StoryState) -> KahaniResult<ArchiveReceipt>;
}

/// One artifact: path relative to the run directory, and its bytes.
pub(crate) type Artifact = (String, Vec<u8>);

/// Longest file name fragment, in bytes, taken from a title.
const MAX_FILE_TITLE_BYTES: usize = 80;

/// File name fragment for an episode title, cut at a char boundary.
fn file_title(title: &str) -> String {
    let mut fragment = String::new();
    for c in title.trim().chars() {
        let c = if c.is_alphanumeric() || c == '-' { c } else { '_' };
        if fragment.len() + c.len_utf8() > MAX_FILE_TITLE_BYTES {
            break;
        }
        fragment.push(c);
    }
    fragment
}

/// Render every artifact of `state`; audio files get `audio_extension`.
pub(crate) fn render_artifacts(state: &StoryState, audio_extension: &str) -> KahaniResult<Vec<Artifact>> {
    let json = serde_json::to_vec_pretty(state)
        .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;

    let mut artifacts: Vec<Artifact> = vec![
        ("story.json".to_string(), json),
        ("story_details.md".to_string(), state.details_markdown().into_bytes()),
        ("final_story.md".to_string(), state.final_story_markdown().into_bytes()),
    ];

    for (language, text) in &state.translations {
        artifacts.push((
            format!("final_story_{}.md", file_title(&language.to_lowercase())),
            text.clone().into_bytes(),
        ));
    }

    for episode in &state.episodes {
        artifacts.push((
            format!("episodes/Episode_{}_{}.md", episode.number, file_title(&episode.title)),
            format!(
                "# Episode {}: {}\n\n{}\n",
                episode.number,
                episode.title,
                state.episode_text(episode)
            )
            .into_bytes(),
        ));
        if let Some(dialogue) = state.dialogues.get(&episode.number) {
            artifacts.push((
                format!("dialogue/dialogue_episode_{}.md", episode.number),
                format!(
                    "# Dialogue for Episode {}: {}\n\n{}\n",
                    episode.number, episode.title, dialogue
                )
                .into_bytes(),
            ));
        }
    }

    for (number, audio) in &state.narrations {
        artifacts.push((
            format!("narration/episode_{}.{}", number, audio_extension),
            audio.clone(),
        ));
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_title_replaces_separators() {
        assert_eq!(file_title("The Dark / Night"), "The_Dark___Night");
        assert_eq!(file_title(" Part-two "), "Part-two");
    }

    #[test]
    fn test_file_title_caps_long_titles() {
        let title = "The keeper climbs the stairs ".repeat(9);
        assert!(title.len() > 250);
        let fragment = file_title(&title);
        assert_eq!(fragment.len(), MAX_FILE_TITLE_BYTES);
        assert!(fragment.starts_with("The_keeper_climbs"));
    }

    #[test]
    fn test_file_title_cuts_on_char_boundary() {
        let title = "灯台守の長い夜".repeat(10);
        let fragment = file_title(&title);
        assert!(fragment.len() <= MAX_FILE_TITLE_BYTES);
        assert!(fragment.len() > MAX_FILE_TITLE_BYTES - 3);
        assert!(title.starts_with(&fragment));
    }
}
