//! Prompt templates for every stage.
//!
//! Each stage sends one system prompt and one human message. Human messages
//! are built from story state by the functions below.

use crate::context::EpisodeContext;
use kahani_core::{Character, ConsistencyIssue, DialogueStyle};

pub(crate) const OUTLINE_SYSTEM: &str = "You are an expert at generating detailed story outlines. \
Given a topic, list the main events of the story: at least 5 to 7 key events that form a coherent \
narrative, each a brief description of a significant plot point. \
Respond with a JSON object of the form {\"events\": [\"...\", \"...\"]} and nothing else.";

pub(crate) const CHARACTERS_SYSTEM: &str = "You are an expert at developing story characters. \
Given a plot, create 3 to 5 distinctive characters. For each give a fitting name, a detailed \
physical and psychological description, and the character's role in the plot. \
Respond with a JSON object of the form \
{\"characters\": [{\"name\": \"...\", \"description\": \"...\", \"role\": \"...\"}]} and nothing else.";

pub(crate) const PLOT_OPTIONS_SYSTEM: &str = "You are a creative writing assistant who proposes plot \
options for a story outline. Generate 10 distinct, creative plot options; each must be a complete plot \
point that could be inserted into the story. Respond with a JSON array of strings, one per option.";

pub(crate) const CONSISTENCY_SYSTEM: &str = "You are a literary editor who checks narrative consistency. \
Find inconsistencies between the story outline and the plot options, or within the plot options. \
For each issue give: plot_option_index (0-based), plot_option_text, issue_type (e.g. timeline \
contradiction, character motivation, plot logic), severity (critical, warning or minor), a \
description of why it is inconsistent, and a list of suggestions to fix it. \
Respond with a JSON array of issue objects with exactly those fields. \
If there are no inconsistencies, respond with an empty array [].";

pub(crate) const IMPROVE_SYSTEM: &str = "You are an expert storyteller who repairs inconsistent plot \
options. Given an outline, problem plot options and the issues found in them, write an improved \
version of each option that keeps its core idea and removes the inconsistencies.";

pub(crate) const SPLIT_SYSTEM: &str = "You are a master storyteller. Split a long narrative into \
interconnected episodes. Given an outline, plot points and characters, give every episode a \
descriptive title, detailed content that moves the story forward, and a dramatic cliffhanger, \
except the final episode whose cliffhanger must be empty. \
Respond with a JSON object of the form \
{\"episodes\": [{\"number\": 1, \"title\": \"...\", \"content\": \"...\", \"cliffhanger\": \"...\"}]} \
and nothing else.";

pub(crate) const ENHANCE_SYSTEM: &str = "You are a master storyteller who writes rich, detailed \
narratives. Expand an episode outline into a complete story of approximately 10,000 words. Keep \
continuity with the summarized previous episodes, resolve the previous cliffhanger, and plant seeds \
for the future episodes. Build toward this episode's cliffhanger when one is required. Add scene \
description, character development and world-building while keeping the plot points and tone. \
Write in a purely narrative voice with no dialogue.";

pub(crate) const DIALOGUE_SYSTEM: &str = "You are an expert creative writer who writes dialogue \
scripts for story episodes. The dialogue must be coherent, engaging and woven into the episode \
storyline and the characters. Give every character a distinct voice and let the conversation flow.";

pub(crate) const TRANSLATE_SYSTEM: &str = "You are an expert literary translator. Translate the text \
into the requested language. Keep the paragraph structure, formatting, titles and headings. The \
result must read naturally, use idioms suited to the target audience and follow the literary style \
of the target language. Respond with the translated text only.";

fn numbered(feedback: &[String]) -> String {
    feedback
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. {}", i + 1, f))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per character: `Name (Role): description`.
pub(crate) fn characters_block(characters: &[Character]) -> String {
    characters
        .iter()
        .map(|c| format!("- {} ({}): {}", c.name(), c.role(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn outline_human(topic: &str) -> String {
    format!(
        "Generate an outline for a story on the following topic: {}. \
         Return the list of events in the \"events\" field.",
        topic
    )
}

pub(crate) fn outline_refine_human(topic: &str, outline: &[String], feedback: &[String]) -> String {
    format!(
        "Topic: {}\n\nCurrent outline:\n{}\n\nRevise the outline to address this feedback, in order:\n{}\n\n\
         Return the complete revised list of events in the \"events\" field.",
        topic,
        bulleted(outline),
        numbered(feedback)
    )
}

pub(crate) fn characters_human(plot: &str) -> String {
    format!(
        "Develop characters for the following plot: {}. Return a list of character objects with \
         \"name\", \"description\" and \"role\" keys in the \"characters\" field.",
        plot
    )
}

pub(crate) fn characters_refine_human(plot: &str, characters: &[Character], feedback: &[String]) -> String {
    format!(
        "Plot: {}\n\nCurrent characters:\n{}\n\nRevise the characters to address this feedback, in order:\n{}\n\n\
         Return the complete revised list in the \"characters\" field.",
        plot,
        characters_block(characters),
        numbered(feedback)
    )
}

pub(crate) fn plot_options_human(story_type: &str, outline: &str) -> String {
    format!(
        "Story Type: {}\nOutline: {}\n\nPlease provide 10 engaging plot options that could enhance this story.",
        story_type, outline
    )
}

/// Plot options listed as `[i] option`, indexed from zero.
pub(crate) fn consistency_human(story_type: &str, outline: &[String], plot_options: &[String]) -> String {
    let indexed = plot_options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("[{}] {}", i, option))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Story type: {}\n\nOutline events:\n{}\n\nPlot options (indexed from 0):\n{}\n\n\
         Check each plot option for consistency with the outline and within the story logic. \
         Return a JSON array of issues and name the plot option index of each.",
        story_type,
        bulleted(outline),
        indexed
    )
}

pub(crate) fn improve_human(
    story_type: &str,
    outline: &[String],
    problems: &[(usize, String)],
    issues: &[ConsistencyIssue],
) -> String {
    let mut problems_text = String::new();
    for (idx, text) in problems {
        problems_text.push_str(&format!("PROBLEM PLOT OPTION [{}]: \"{}\"\n", idx, text));
        let relevant = issues.iter().filter(|i| i.plot_option_index == Some(*idx));
        for (n, issue) in relevant.enumerate() {
            problems_text.push_str(&format!(
                "Issue {}: {} - {}\n",
                n + 1,
                issue.issue_type,
                issue.description
            ));
        }
        problems_text.push('\n');
    }
    format!(
        "Story type: {}\n\nOutline events:\n{}\n\nProblems to fix:\n{}\n\
         Write one improved version of each problem plot option, {} in total, that fixes the issues \
         while keeping the core idea. Format the answer as a numbered list in the same order as the \
         problems above.",
        story_type,
        bulleted(outline),
        problems_text,
        problems.len()
    )
}

pub(crate) fn split_human(num_episodes: u32, outline: &str, plots: &[String], characters: &[Character]) -> String {
    format!(
        "Split the story into {} episodes.\n\nOutline: {}\n\nPlot points:\n{}\n\nCharacters:\n{}\n\n\
         For each episode provide \"number\" (starting at 1), \"title\", \"content\" (a detailed \
         narrative that develops the plot) and \"cliffhanger\" (empty for the final episode). \
         Make the episodes connect smoothly.",
        num_episodes,
        outline,
        bulleted(plots),
        characters_block(characters)
    )
}

pub(crate) fn enhance_human(ctx: &EpisodeContext) -> String {
    format!(
        "Expand the following episode outline to approximately 10,000 words while keeping narrative \
         coherence and continuity.\n\n\
         Episode Number: {}\n\
         Episode Title: {}\n\
         Previous Episodes Summary: {}\n\
         Previous Cliffhanger: {}\n\
         Episode Outline: {}\n\
         Should End With Cliffhanger: {}\n\
         Future Episodes Outlines: {}\n\
         Characters:\n{}\n\n\
         Foreshadow the future episodes, resolve the previous cliffhanger if there is one, and respond \
         with the lengthened story only, in a narrative voice without dialogue.",
        ctx.episode_number(),
        ctx.title(),
        or_none(ctx.previous_summary()),
        or_none(ctx.previous_cliffhanger()),
        ctx.outline(),
        if *ctx.include_cliffhanger() { "Yes" } else { "No" },
        or_none(ctx.future_outlines()),
        ctx.characters()
    )
}

fn or_none(text: &str) -> &str {
    if text.trim().is_empty() { "None" } else { text }
}

pub(crate) fn dialogue_human(
    style: DialogueStyle,
    story_type: &str,
    storyline: &str,
    characters: &[Character],
) -> String {
    let guidance = match style {
        DialogueStyle::Novel => {
            "Make the narrator's voice prominent alongside the character dialogue."
        }
        DialogueStyle::Drama => {
            "Focus on the conversation between characters with minimal narration."
        }
    };
    format!(
        "Generate a dialogue script for the following episode.\n\n\
         Style: {}\nGenre: {}\nEpisode Storyline: {}\nCharacters:\n{}\n\n{}",
        style,
        story_type,
        storyline,
        characters_block(characters),
        guidance
    )
}

pub(crate) fn translate_human(language: &str, text: &str) -> String {
    format!(
        "Translate the following text to {}. Preserve the paragraph structure.\n\n{}",
        language, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_prompt_indexes_from_zero() {
        let prompt = consistency_human(
            "ghost",
            &["A storm".to_string()],
            &["First".to_string(), "Second".to_string()],
        );
        assert!(prompt.contains("[0] First\n[1] Second"));
        assert!(prompt.contains("- A storm"));
    }

    #[test]
    fn test_improve_prompt_lists_issues_per_problem() {
        let issue = ConsistencyIssue {
            plot_option_index: Some(3),
            plot_option_text: None,
            issue_type: "Timeline".into(),
            severity: "critical".into(),
            description: "Too early".into(),
            suggestions: vec![],
            synthetic: false,
        };
        let prompt = improve_human("general", &[], &[(3, "The ship sinks".into())], &[issue]);
        assert!(prompt.contains("PROBLEM PLOT OPTION [3]: \"The ship sinks\""));
        assert!(prompt.contains("Issue 1: Timeline - Too early"));
    }

    #[test]
    fn test_refine_prompt_carries_all_feedback_in_order() {
        let prompt = outline_refine_human(
            "Lighthouse",
            &["A storm".into()],
            &["More fog".into(), "Darker ending".into()],
        );
        assert!(prompt.contains("1. More fog\n2. Darker ending"));
    }
}
