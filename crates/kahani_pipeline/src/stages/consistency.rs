//! Consistency checking of plot options against the outline.

use crate::prompts;
use kahani_core::ConsistencyIssue;
use kahani_extract::story::{parse_consistency_issues, parse_improved_options};
use kahani_interface::KahaniDriver;
use std::sync::Arc;

/// Finds inconsistent plot options and proposes improved versions.
///
/// Neither operation fails: a transport error becomes a synthetic
/// "Processing Error" issue or placeholder improvements.
pub struct ConsistencyChecker {
    driver: Arc<dyn KahaniDriver>,
}

impl ConsistencyChecker {
    /// Checker backed by `driver`.
    pub fn new(driver: Arc<dyn KahaniDriver>) -> Self {
        Self { driver }
    }

    /// Issues between `outline` and `plot_options`.
    #[tracing::instrument(skip_all, fields(model = self.driver.model_name(), options = plot_options.len()))]
    pub async fn check(
        &self,
        story_type: &str,
        outline: &[String],
        plot_options: &[String],
    ) -> Vec<ConsistencyIssue> {
        let human = prompts::consistency_human(story_type, outline, plot_options);
        match self.driver.complete(prompts::CONSISTENCY_SYSTEM, &human).await {
            Ok(reply) => {
                let parsed = parse_consistency_issues(&reply.text, plot_options);
                tracing::info!(
                    issues = parsed.value.len(),
                    critical = parsed.value.iter().filter(|i| i.is_critical()).count(),
                    strategy = parsed.strategy,
                    "Consistency check complete"
                );
                parsed.value
            }
            Err(e) => {
                tracing::warn!(error = %e, "Consistency check failed");
                vec![processing_error(&e.to_string())]
            }
        }
    }

    /// One improved option per entry of `problems`, in the same order.
    #[tracing::instrument(skip_all, fields(model = self.driver.model_name(), problems = problems.len()))]
    pub async fn improve(
        &self,
        story_type: &str,
        outline: &[String],
        problems: &[(usize, String)],
        issues: &[ConsistencyIssue],
    ) -> Vec<String> {
        let human = prompts::improve_human(story_type, outline, problems, issues);
        match self.driver.complete(prompts::IMPROVE_SYSTEM, &human).await {
            Ok(reply) => parse_improved_options(&reply.text, problems.len()).value,
            Err(e) => {
                tracing::warn!(error = %e, "Plot option improvement failed");
                problems
                    .iter()
                    .map(|(idx, _)| format!("Improved version of option {}", idx))
                    .collect()
            }
        }
    }
}

fn processing_error(message: &str) -> ConsistencyIssue {
    ConsistencyIssue {
        plot_option_index: None,
        plot_option_text: None,
        issue_type: "Processing Error".to_string(),
        severity: "warning".to_string(),
        description: format!("Error during consistency check: {}", message),
        suggestions: vec!["Try again later".to_string()],
        synthetic: true,
    }
}

/// Distinct in-range plot option indices named by `issues`, ascending.
pub(crate) fn problem_indices(issues: &[ConsistencyIssue], option_count: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = issues
        .iter()
        .filter_map(|i| i.plot_option_index)
        .filter(|&i| i < option_count)
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}
