//! Plot options, consistency repair and plot selection.

use super::Stage;
use super::consistency::{ConsistencyChecker, problem_indices};
use crate::prompts;
use async_trait::async_trait;
use kahani_core::{PipelineStage, StoryState};
use kahani_error::KahaniResult;
use kahani_extract::plot_twists;
use kahani_extract::story::parse_plot_options;
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// How many plot options feed the episode split: between 3 and 5, two
/// fewer than the episode count.
///
/// ```
/// use kahani_pipeline::auto_select_count;
///
/// assert_eq!(auto_select_count(2), 3);
/// assert_eq!(auto_select_count(6), 4);
/// assert_eq!(auto_select_count(12), 5);
/// ```
pub fn auto_select_count(num_episodes: u32) -> usize {
    (num_episodes as usize).saturating_sub(2).clamp(3, 5)
}

/// Generates plot options, optionally repairs inconsistent ones, and
/// selects the options used for the split.
pub struct PlotStage {
    driver: Arc<dyn KahaniDriver>,
    checker: Option<ConsistencyChecker>,
}

impl PlotStage {
    /// Plot stage without consistency checking.
    pub fn new(driver: Arc<dyn KahaniDriver>) -> Self {
        Self {
            driver,
            checker: None,
        }
    }

    /// Check and repair options with `checker` when the request asks for it.
    pub fn with_checker(mut self, checker: ConsistencyChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    async fn generate_options(&self, state: &mut StoryState) {
        let story_type = state.request.story_type().clone();
        let human = prompts::plot_options_human(&story_type, &state.outline_text());

        match self.driver.complete(prompts::PLOT_OPTIONS_SYSTEM, &human).await {
            Ok(reply) => {
                let parsed = parse_plot_options(&reply.text, &story_type);
                tracing::info!(
                    options = parsed.value.len(),
                    strategy = parsed.strategy,
                    synthetic = parsed.synthetic,
                    "Plot options generated"
                );
                state.plot_options = parsed.value;
                state.plot_options_synthetic = parsed.synthetic;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Plot option generation failed, using built-in twists");
                state.warn(format!("Plot option generation failed: {}", e));
                state.plot_options = plot_twists(&story_type).iter().map(|s| s.to_string()).collect();
                state.plot_options_synthetic = true;
            }
        }
    }

    async fn repair_options(&self, checker: &ConsistencyChecker, state: &mut StoryState) {
        let story_type = state.request.story_type().clone();
        let issues = checker
            .check(&story_type, &state.outline, &state.plot_options)
            .await;

        let problems: Vec<(usize, String)> = problem_indices(&issues, state.plot_options.len())
            .into_iter()
            .map(|i| (i, state.plot_options[i].clone()))
            .collect();

        if problems.is_empty() {
            state.consistency_issues = issues;
            return;
        }

        let improved = checker
            .improve(&story_type, &state.outline, &problems, &issues)
            .await;
        for ((idx, _), replacement) in problems.iter().zip(improved) {
            tracing::debug!(index = idx, "Replacing inconsistent plot option");
            state.plot_options[*idx] = replacement;
        }

        // Report what remains after the repair
        state.consistency_issues = checker
            .check(&story_type, &state.outline, &state.plot_options)
            .await;
    }
}

#[async_trait]
impl Stage for PlotStage {
    fn kind(&self) -> PipelineStage {
        PipelineStage::Plot
    }

    #[tracing::instrument(skip_all, fields(model = self.driver.model_name()))]
    async fn run(&self, state: &mut StoryState, _feedback: &[String]) -> KahaniResult<()> {
        self.generate_options(state).await;

        if *state.request.check_consistency() {
            match &self.checker {
                Some(checker) => self.repair_options(checker, state).await,
                None => tracing::warn!("Consistency check requested but no checker configured"),
            }
        }

        let count = auto_select_count(*state.request.num_episodes());
        state.selected_plots = state.plot_options.iter().take(count).cloned().collect();
        state.detailed_plot = format!(
            "{}\n\nPlot points:\n{}",
            state.outline_text(),
            state
                .selected_plots
                .iter()
                .map(|p| format!("- {}", p))
                .collect::<Vec<_>>()
                .join("\n")
        );

        tracing::info!(selected = state.selected_plots.len(), "Plot options selected");
        Ok(())
    }
}
