//! Story runs as directories of markdown, JSON and audio files.

use super::{ArchiveReceipt, StoryArchive, render_artifacts};
use async_trait::async_trait;
use kahani_core::StoryState;
use kahani_error::{KahaniResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

/// Writes each run to `{root}/{slug}/`.
///
/// Every file is written to a temporary sibling first and renamed into
/// place, so a crashed run never leaves a half-written artifact.
#[derive(Debug, Clone)]
pub struct FilesystemArchive {
    root: PathBuf,
    audio_extension: String,
}

impl FilesystemArchive {
    /// Archive rooted at `root`, storing narration as mp3.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            audio_extension: "mp3".to_string(),
        }
    }

    /// Use `extension` for narration files.
    pub fn with_audio_extension(mut self, extension: impl Into<String>) -> Self {
        self.audio_extension = extension.into();
        self
    }

    /// Directory runs are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_file(path: &Path, data: &[u8]) -> KahaniResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;
        Ok(())
    }
}

#[async_trait]
impl StoryArchive for FilesystemArchive {
    #[tracing::instrument(skip(self, state), fields(root = %self.root.display()))]
    async fn persist(&self, state: &StoryState) -> KahaniResult<ArchiveReceipt> {
        let run_dir = self.root.join(state.slug());
        tokio::fs::create_dir_all(&run_dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                run_dir.display(),
                e
            )))
        })?;

        let artifacts = render_artifacts(state, &self.audio_extension)?;
        let mut files = Vec::with_capacity(artifacts.len());
        for (name, data) in artifacts {
            let path = run_dir.join(&name);
            Self::write_file(&path, &data).await?;
            tracing::debug!(path = %path.display(), size = data.len(), "Wrote artifact");
            files.push(name);
        }

        tracing::info!(path = %run_dir.display(), files = files.len(), "Story saved");
        Ok(ArchiveReceipt::new(run_dir.to_string_lossy(), files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kahani_core::{Episode, StoryRequest};

    #[tokio::test]
    async fn test_persist_writes_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FilesystemArchive::new(dir.path()).with_audio_extension("wav");

        let request = StoryRequest::builder().topic("Tide pools").build().unwrap();
        let mut state = StoryState::new(request);
        state.episodes.push(Episode {
            number: 1,
            title: "Low Tide".into(),
            content: "The sea pulls back.".into(),
            cliffhanger: String::new(),
            synthetic: false,
        });
        state.narrations.insert(1, vec![1, 2, 3]);

        let receipt = archive.persist(&state).await.unwrap();
        let run_dir = PathBuf::from(receipt.location());
        assert!(run_dir.starts_with(dir.path()));

        let episode = std::fs::read_to_string(run_dir.join("episodes/Episode_1_Low_Tide.md")).unwrap();
        assert!(episode.starts_with("# Episode 1: Low Tide"));
        assert_eq!(std::fs::read(run_dir.join("narration/episode_1.wav")).unwrap(), vec![1, 2, 3]);
        assert!(!run_dir.join("story.tmp").exists());
    }

    #[tokio::test]
    async fn test_persist_handles_very_long_episode_title() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FilesystemArchive::new(dir.path());

        let title = "A storm that would not end and a keeper who would not leave ".repeat(5);
        let request = StoryRequest::builder().topic("Long nights").build().unwrap();
        let mut state = StoryState::new(request);
        state.episodes.push(Episode {
            number: 1,
            title: title.clone(),
            content: "Rain.".into(),
            cliffhanger: String::new(),
            synthetic: false,
        });

        let receipt = archive.persist(&state).await.unwrap();
        let episodes: Vec<_> = std::fs::read_dir(PathBuf::from(receipt.location()).join("episodes"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(episodes.len(), 1);
        assert!(episodes[0].len() < 255);
        assert!(episodes[0].starts_with("Episode_1_A_storm_that"));
    }
}
