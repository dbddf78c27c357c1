//! In-process archive.

use super::{ArchiveReceipt, StoryArchive, render_artifacts};
use async_trait::async_trait;
use kahani_core::StoryState;
use kahani_error::KahaniResult;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

type Runs = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// Keeps every run's artifacts in memory, keyed by run slug.
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    runs: Mutex<Runs>,
}

impl InMemoryArchive {
    /// Empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Runs> {
        self.runs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Slugs of stored runs.
    pub fn runs(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Artifact `name` of run `slug`.
    pub fn file(&self, slug: &str, name: &str) -> Option<Vec<u8>> {
        self.lock().get(slug).and_then(|files| files.get(name).cloned())
    }

    /// Artifact `name` of run `slug` as text.
    pub fn text(&self, slug: &str, name: &str) -> Option<String> {
        self.file(slug, name)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
impl StoryArchive for InMemoryArchive {
    async fn persist(&self, state: &StoryState) -> KahaniResult<ArchiveReceipt> {
        let slug = state.slug();
        let artifacts = render_artifacts(state, "mp3")?;
        let files: Vec<String> = artifacts.iter().map(|(name, _)| name.clone()).collect();
        self.lock().insert(slug.clone(), artifacts.into_iter().collect());
        tracing::debug!(%slug, files = files.len(), "Story kept in memory");
        Ok(ArchiveReceipt::new(format!("memory://{}", slug), files))
    }
}
