//! Translate the final story into each requested language.

use super::Stage;
use crate::prompts;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_dispatch::{DispatchReport, Dispatcher, chunk_text};
use kahani_error::KahaniResult;
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// Translates the final story chunk by chunk.
///
/// A chunk whose call fails stays untranslated and the run records a
/// warning. A language where every chunk fails gets no translation.
pub struct TranslateStage {
    driver: Arc<dyn KahaniDriver>,
    dispatcher: Dispatcher,
    max_chunk_chars: usize,
}

impl TranslateStage {
    /// Translate stage splitting text into chunks of at most `max_chunk_chars`.
    pub fn new(driver: Arc<dyn KahaniDriver>, dispatcher: Dispatcher, max_chunk_chars: usize) -> Self {
        Self {
            driver,
            dispatcher,
            max_chunk_chars: max_chunk_chars.max(1),
        }
    }

    /// Translated text plus per-chunk warnings, or `None` when no chunk succeeded.
    async fn translate(&self, language: &str, chunks: Vec<String>) -> Option<(String, Vec<String>)> {
        let driver = &self.driver;
        let outcomes = self
            .dispatcher
            .run(chunks.clone(), |_, chunk| async move {
                let human = prompts::translate_human(language, &chunk);
                driver
                    .complete(prompts::TRANSLATE_SYSTEM, &human)
                    .await
                    .map(|reply| reply.text)
            })
            .await;
        let report = DispatchReport::from_outcomes(&outcomes);
        report.log(language);
        if report.all_failed() {
            return None;
        }

        let mut warnings = Vec::new();
        let parts: Vec<String> = outcomes
            .into_iter()
            .zip(chunks)
            .map(|(outcome, original)| match outcome.result {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    warnings.push(format!(
                        "Translation to {} failed for chunk {}; kept the original text: {}",
                        language,
                        outcome.index + 1,
                        e.kind
                    ));
                    original
                }
            })
            .collect();
        Some((parts.join("\n\n"), warnings))
    }
}

#[async_trait]
impl Stage for TranslateStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Translate
    }

    #[tracing::instrument(skip_all, fields(model = self.driver.model_name(), languages = state.request.languages().len()))]
    async fn run(&self, state: &mut StoryState, _feedback: &[String]) -> KahaniResult<()> {
        let languages = state.request.languages().clone();
        if languages.is_empty() {
            tracing::debug!("No translation languages requested");
            return Ok(());
        }

        let story = state.final_story_markdown();
        let chunks = chunk_text(&story, self.max_chunk_chars);

        for language in languages {
            let Some((translated, warnings)) = self.translate(&language, chunks.clone()).await else {
                tracing::warn!(%language, "Every translation chunk failed");
                state.warn(format!(
                    "Translation to {} failed for every chunk; skipped",
                    language
                ));
                continue;
            };
            for warning in warnings {
                state.warn(warning);
            }
            tracing::info!(%language, chars = translated.len(), "Story translated");
            state.translations.insert(language, translated);
        }
        Ok(())
    }
}
