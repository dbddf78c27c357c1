//! Per-episode context for the enhancement stage.

use derive_builder::Builder;
use derive_getters::Getters;
use kahani_core::Episode;

/// Number of upcoming episodes shown to the model for foreshadowing.
const FUTURE_EPISODES: usize = 3;

/// Everything the model needs to lengthen one episode in continuity.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Builder)]
#[builder(setter(into))]
pub struct EpisodeContext {
    /// Episode number.
    episode_number: u32,
    /// Episode title.
    title: String,
    /// Episode outline, including the cliffhanger to build toward.
    outline: String,
    /// `n. title` plus content of every earlier episode.
    #[builder(default)]
    previous_summary: String,
    /// Cliffhanger the previous episode ended on.
    #[builder(default)]
    previous_cliffhanger: String,
    /// Outlines of up to three following episodes.
    #[builder(default)]
    future_outlines: String,
    /// Character list.
    #[builder(default)]
    characters: String,
    /// Whether this episode should end on a cliffhanger.
    #[builder(default)]
    include_cliffhanger: bool,
}

impl EpisodeContext {
    /// Start building a context.
    pub fn builder() -> EpisodeContextBuilder {
        EpisodeContextBuilder::default()
    }
}

/// Build one context per episode, in order.
///
/// Contexts depend on earlier episodes, so they are built sequentially
/// before the episodes are lengthened in parallel.
pub fn build_contexts(episodes: &[Episode], characters: &str) -> Vec<EpisodeContext> {
    let mut summary = String::new();
    let mut previous_cliffhanger = String::new();
    let mut contexts = Vec::with_capacity(episodes.len());

    for (position, episode) in episodes.iter().enumerate() {
        let future_outlines = episodes
            .iter()
            .skip(position + 1)
            .take(FUTURE_EPISODES)
            .map(|e| format!("Episode {} - {}: {}", e.number, e.title, e.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let include_cliffhanger = !episode.cliffhanger.trim().is_empty();
        let outline = if include_cliffhanger {
            format!(
                "{}\n\nCliffhanger to build toward: {}",
                episode.content, episode.cliffhanger
            )
        } else {
            episode.content.clone()
        };

        contexts.push(EpisodeContext {
            episode_number: episode.number,
            title: episode.title.clone(),
            outline,
            previous_summary: summary.trim_end().to_string(),
            previous_cliffhanger: previous_cliffhanger.clone(),
            future_outlines,
            characters: characters.to_string(),
            include_cliffhanger,
        });

        summary.push_str(&format!(
            "{}. {}\n{}\n\n",
            episode.number, episode.title, episode.content
        ));
        previous_cliffhanger = episode.cliffhanger.clone();
    }

    contexts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(number: u32, cliffhanger: &str) -> Episode {
        Episode {
            number,
            title: format!("Title {}", number),
            content: format!("Content {}", number),
            cliffhanger: cliffhanger.to_string(),
            synthetic: false,
        }
    }

    #[test]
    fn test_contexts_accumulate_history() {
        let episodes: Vec<Episode> = (1..=5)
            .map(|n| episode(n, if n < 5 { "hook" } else { "" }))
            .collect();
        let contexts = build_contexts(&episodes, "- Asha (Lead): keeper");

        assert_eq!(contexts.len(), 5);
        assert_eq!(contexts[0].previous_summary(), "");
        assert_eq!(contexts[0].previous_cliffhanger(), "");
        assert_eq!(
            contexts[2].previous_summary(),
            "1. Title 1\nContent 1\n\n2. Title 2\nContent 2"
        );
        assert_eq!(contexts[2].previous_cliffhanger(), "hook");
        assert!(*contexts[0].include_cliffhanger());
        assert!(!*contexts[4].include_cliffhanger());
    }

    #[test]
    fn test_future_outlines_limited_to_three() {
        let episodes: Vec<Episode> = (1..=6).map(|n| episode(n, "")).collect();
        let contexts = build_contexts(&episodes, "");

        let future = contexts[0].future_outlines();
        assert!(future.starts_with("Episode 2 - Title 2: Content 2"));
        assert!(future.contains("Episode 4"));
        assert!(!future.contains("Episode 5"));
        assert_eq!(contexts[5].future_outlines(), "");
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = EpisodeContext::builder()
            .episode_number(1u32)
            .title("Arrival")
            .outline("The keeper arrives.")
            .build()
            .unwrap();
        assert!(!*ctx.include_cliffhanger());
        assert_eq!(ctx.previous_summary(), "");
    }
}
