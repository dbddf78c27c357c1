//! Parsers for each pipeline stage's model reply.
//!
//! Each parser builds an [`ExtractionSchema`], runs the default
//! [`Extractor`] chain and converts the records into story types. Every
//! parser is a pure function of its inputs.

use crate::extractor::{Extraction, Extractor};
use crate::labeled::split_list;
use crate::library::plot_twists;
use crate::record::ExtractedRecord;
use crate::schema::{ExtractionSchema, FieldSpec};
use kahani_core::{Character, ConsistencyIssue, Episode};
use tracing::{debug, warn};

/// Shortest plain-text plot option accepted.
const MIN_PLOT_OPTION_CHARS: usize = 11;

/// Shortest paragraph accepted as an improved plot option.
const MIN_IMPROVED_PARAGRAPH_CHARS: usize = 21;

/// A parsed value with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    /// The parsed value
    pub value: T,
    /// Strategy that produced it
    pub strategy: &'static str,
    /// True when any part of the value is a placeholder
    pub synthetic: bool,
}

impl<T> Parsed<T> {
    fn from_extraction(extraction: &Extraction, value: T) -> Self {
        Self {
            value,
            strategy: extraction.strategy,
            synthetic: extraction.synthetic,
        }
    }
}

/// Schema for the outline reply: a list of events.
pub fn outline_schema() -> ExtractionSchema {
    ExtractionSchema::strings("outline").wrapped_in(["events", "outline", "plot_points"])
}

/// Schema for the plot options reply.
pub fn plot_options_schema() -> ExtractionSchema {
    ExtractionSchema::strings("plot_options")
        .wrapped_in(["plot_options", "options", "plots"])
        .min_item_len(MIN_PLOT_OPTION_CHARS)
}

/// Schema for the character reply.
pub fn character_schema() -> ExtractionSchema {
    ExtractionSchema::list("characters")
        .with_field(
            FieldSpec::text("name")
                .required()
                .labels(["character", "character name", "full name"]),
        )
        .with_field(FieldSpec::text("description").labels([
            "desc",
            "background",
            "personality",
            "appearance",
            "bio",
            "details",
        ]))
        .with_field(FieldSpec::text("role").labels(["character role", "function", "part"]))
        .wrapped_in(["characters", "cast"])
}

/// Schema for the episode split reply with `num_episodes` slots.
pub fn episode_schema(num_episodes: usize) -> ExtractionSchema {
    ExtractionSchema::list("episodes")
        .with_field(
            FieldSpec::number("number")
                .labels(["episode", "episode number", "ep"])
                .placeholder("{n}"),
        )
        .with_field(
            FieldSpec::text("title")
                .required()
                .labels(["episode title", "name", "heading"])
                .headline()
                .placeholder("Episode {n}"),
        )
        .with_field(
            FieldSpec::text("content")
                .required()
                .labels([
                    "outline",
                    "summary",
                    "description",
                    "plot",
                    "synopsis",
                    "events",
                    "episode content",
                ])
                .body()
                .placeholder("Outline for episode {n} could not be parsed."),
        )
        .with_field(FieldSpec::text("cliffhanger").labels(["cliff hanger", "hook", "ending hook"]))
        .wrapped_in(["episodes"])
        .boundary(
            r"(?i)^(?:#+\s*)?\**\s*Episode\s+(\d+)\s*\**\s*(?:[:.\-–]\s*\**\s*(.*?))?\s*\**\s*$",
            ["number", "title"],
        )
        .expect_records(num_episodes)
}

/// Schema for the consistency checker reply over `plot_option_count` options.
pub fn consistency_schema(plot_option_count: usize) -> ExtractionSchema {
    ExtractionSchema::list("consistency_issues")
        .with_field(
            FieldSpec::index("plot_option_index", plot_option_count)
                .labels(["plot option", "option", "option index", "index"])
                .pattern(r"(?i)(?:plot\s+option|option)\s*[:#]?\s*\[?(\d+)"),
        )
        .with_field(
            FieldSpec::text("plot_option_text")
                .labels(["plot option text", "option text", "text"])
                .pattern(r#""([^"]+)""#),
        )
        .with_field(
            FieldSpec::text("issue_type")
                .required()
                .labels(["type", "issue type", "issue", "category"])
                .default_value("Unknown"),
        )
        .with_field(
            FieldSpec::text("severity")
                .labels(["level", "priority"])
                .default_value("warning"),
        )
        .with_field(
            FieldSpec::text("description")
                .required()
                .labels(["problem", "explanation", "details"])
                .default_value("No description provided"),
        )
        .with_field(FieldSpec::list("suggestions").labels([
            "suggestion",
            "fixes",
            "fix",
            "solutions",
            "solution",
            "recommendations",
        ]))
        .wrapped_in(["issues", "inconsistencies", "consistency_issues"])
        .boundary(
            r"(?i)^(?:#+\s*)?\**\s*(?:Issue|Inconsistency|Problem)\s*#?\s*(\d+)\s*\**\s*[:.\-]\s*\**\s*(.*?)\s*\**\s*$",
            ["issue_number", "issue_type"],
        )
        .sentinel(r"(?i)(?:no|zero) (?:inconsistencies|issues|problems) (?:were )?(?:found|detected)")
        .fallback_record([
            ("issue_type", "Parsing Error"),
            ("severity", "warning"),
            (
                "description",
                "Could not parse specific issues from the consistency checker output",
            ),
            (
                "suggestions",
                "Review the LLM response manually | Try again with more specific instructions",
            ),
        ])
}

/// Schema for the improved plot options reply.
pub fn improved_options_schema() -> ExtractionSchema {
    ExtractionSchema::strings("improved_options")
        .wrapped_in(["improved_options", "options", "plot_options"])
}

fn string_values(extraction: &Extraction) -> Vec<String> {
    extraction
        .records
        .iter()
        .filter(|r| !r.synthetic)
        .filter_map(|r| r.text("value"))
        .map(str::to_string)
        .collect()
}

/// Outline events.
///
/// Accepts a JSON array, an object with an `events` key, a bracketed
/// single-quoted list, or bulleted lines, and finally any non-empty lines
/// when there are at least two. Returns an empty synthetic value when
/// nothing parses.
pub fn parse_outline_events(text: &str) -> Parsed<Vec<String>> {
    let extraction = Extractor::new().extract(text, &outline_schema());
    if !extraction.synthetic {
        let events = string_values(&extraction);
        return Parsed::from_extraction(&extraction, events);
    }

    let lines: Vec<String> = split_list(text)
        .into_iter()
        .filter(|l| !l.ends_with(':'))
        .collect();
    if lines.len() >= 2 {
        debug!(count = lines.len(), "Using plain lines as outline events");
        return Parsed {
            value: lines,
            strategy: "plain_lines",
            synthetic: false,
        };
    }

    Parsed::from_extraction(&extraction, Vec::new())
}

/// Plot options, falling back to the stock twists for `story_type`.
pub fn parse_plot_options(text: &str, story_type: &str) -> Parsed<Vec<String>> {
    let extraction = Extractor::new().extract(text, &plot_options_schema());
    let options = string_values(&extraction);
    if !extraction.synthetic && !options.is_empty() {
        return Parsed::from_extraction(&extraction, options);
    }

    warn!(story_type, "Using built-in plot twists");
    Parsed {
        value: plot_twists(story_type).iter().map(|s| s.to_string()).collect(),
        strategy: "library",
        synthetic: true,
    }
}

/// Characters with name, description and role.
///
/// Returns an empty synthetic value when nothing parses.
pub fn parse_characters(text: &str) -> Parsed<Vec<Character>> {
    let extraction = Extractor::new().extract(text, &character_schema());
    let characters = extraction
        .records
        .iter()
        .filter(|r| !r.synthetic)
        .map(|r| {
            Character::new(
                r.text("name").unwrap_or_default(),
                r.text("description").unwrap_or_default(),
                r.text("role").unwrap_or_default(),
            )
        })
        .collect();
    Parsed::from_extraction(&extraction, characters)
}

/// Episodes, numbered 1..=len in reply order.
///
/// When at least one episode parses but fewer than `num_episodes` do, the
/// list is padded with flagged placeholder episodes. The last episode never
/// has a cliffhanger. Returns an empty synthetic value when nothing parses.
pub fn parse_episodes(text: &str, num_episodes: usize) -> Parsed<Vec<Episode>> {
    let schema = episode_schema(num_episodes);
    let extraction = Extractor::new().extract(text, &schema);

    let mut episodes: Vec<Episode> = extraction
        .records
        .iter()
        .filter(|r| !r.synthetic)
        .enumerate()
        .map(|(i, r)| {
            let number = episode_number(i);
            if let Some(given) = r.number("number")
                && given != u64::from(number)
            {
                debug!(given, number, "Renumbering episode");
            }
            Episode {
                number,
                title: r.text("title").unwrap_or_default().to_string(),
                content: r.text("content").unwrap_or_default().to_string(),
                cliffhanger: r.text("cliffhanger").unwrap_or_default().to_string(),
                synthetic: false,
            }
        })
        .collect();

    if episodes.is_empty() {
        return Parsed::from_extraction(&extraction, episodes);
    }

    let parsed = episodes.len();
    if parsed < num_episodes {
        warn!(parsed, requested = num_episodes, "Padding episodes with placeholders");
        episodes.extend((parsed..num_episodes).map(|i| placeholder_episode(episode_number(i))));
    }

    if let Some(last) = episodes.last_mut() {
        last.cliffhanger.clear();
    }

    Parsed {
        synthetic: episodes.iter().any(|e| e.synthetic),
        value: episodes,
        strategy: extraction.strategy,
    }
}

fn episode_number(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

fn placeholder_episode(number: u32) -> Episode {
    Episode {
        number,
        title: format!("Episode {}", number),
        content: format!("Outline for episode {} could not be parsed.", number),
        cliffhanger: String::new(),
        synthetic: true,
    }
}

/// Consistency issues between the outline and `plot_options`.
///
/// Index fields are brought into range or dropped, and a missing option
/// text is filled in from `plot_options`. A "no inconsistencies found"
/// reply yields no issues; an unparseable one yields a single synthetic
/// "Parsing Error" issue.
pub fn parse_consistency_issues(text: &str, plot_options: &[String]) -> Parsed<Vec<ConsistencyIssue>> {
    let extraction = Extractor::new().extract(text, &consistency_schema(plot_options.len()));
    let issues = extraction
        .records
        .iter()
        .map(|r| issue_from_record(r, plot_options))
        .collect();
    Parsed::from_extraction(&extraction, issues)
}

fn issue_from_record(record: &ExtractedRecord, plot_options: &[String]) -> ConsistencyIssue {
    let plot_option_index = record.index("plot_option_index");
    let plot_option_text = record
        .text("plot_option_text")
        .map(str::to_string)
        .or_else(|| plot_option_index.and_then(|i| plot_options.get(i).cloned()));

    ConsistencyIssue {
        plot_option_index,
        plot_option_text,
        issue_type: record.text("issue_type").unwrap_or("Unknown").to_string(),
        severity: record.text("severity").unwrap_or("warning").to_string(),
        description: record
            .text("description")
            .unwrap_or("No description provided")
            .to_string(),
        suggestions: record.list("suggestions"),
        synthetic: record.synthetic,
    }
}

/// Exactly `expected` improved plot options.
///
/// Accepts JSON, numbered or `Option N:` items, then paragraphs longer than
/// twenty characters. Missing entries are padded with flagged placeholders
/// and extra entries dropped.
pub fn parse_improved_options(text: &str, expected: usize) -> Parsed<Vec<String>> {
    let extraction = Extractor::new().extract(text, &improved_options_schema());
    let (mut options, strategy) = if extraction.synthetic {
        let paragraphs: Vec<String> = text
            .split("\n\n")
            .map(|p| p.trim().to_string())
            .filter(|p| p.chars().count() >= MIN_IMPROVED_PARAGRAPH_CHARS)
            .collect();
        (paragraphs, "paragraphs")
    } else {
        (string_values(&extraction), extraction.strategy)
    };

    let synthetic = options.len() < expected;
    if synthetic {
        warn!(parsed = options.len(), expected, "Padding improved plot options");
    }
    options.extend((options.len()..expected).map(|i| format!("Improved version of option {}", i + 1)));
    options.truncate(expected);

    Parsed {
        value: options,
        strategy,
        synthetic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_from_events_object() {
        let parsed = parse_outline_events(r#"{"events": ["Storm hits", "Lamp fails"]}"#);
        assert_eq!(parsed.value, vec!["Storm hits", "Lamp fails"]);
        assert!(!parsed.synthetic);
    }

    #[test]
    fn test_outline_from_plain_lines() {
        let parsed = parse_outline_events("The keeper arrives\nThe storm begins\nThe lamp fails");
        assert_eq!(parsed.value.len(), 3);
        assert_eq!(parsed.strategy, "plain_lines");
    }

    #[test]
    fn test_outline_gibberish_is_empty_and_synthetic() {
        let parsed = parse_outline_events("???");
        assert!(parsed.value.is_empty());
        assert!(parsed.synthetic);
    }

    #[test]
    fn test_plot_options_library_fallback() {
        let parsed = parse_plot_options("sorry", "ghost");
        assert!(parsed.synthetic);
        assert_eq!(parsed.strategy, "library");
        assert_eq!(parsed.value.len(), 10);
        assert!(parsed.value[0].starts_with("The ghost"));
    }

    #[test]
    fn test_plot_options_numbered_lines_skip_short() {
        let text = "1. A ghost ship drifts into the harbor\n2. Short\n3. The keeper's diary names the killer";
        let parsed = parse_plot_options(text, "general");
        assert_eq!(parsed.value.len(), 2);
        assert!(!parsed.synthetic);
    }

    #[test]
    fn test_characters_from_json_with_missing_role() {
        let parsed = parse_characters(r#"[{"name": "Asha", "description": "Keeper"}]"#);
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.value[0].role(), "");
    }

    #[test]
    fn test_episode_padding_requires_a_real_episode() {
        let parsed = parse_episodes("Episode 1: Fog\nThe fog rolls in.\nCliffhanger: A scream.", 3);
        assert_eq!(parsed.value.len(), 3);
        assert!(parsed.synthetic);
        assert!(!parsed.value[0].synthetic);
        assert!(parsed.value[2].synthetic);
        assert_eq!(parsed.value[0].cliffhanger, "A scream.");
        assert_eq!(parsed.value[2].cliffhanger, "");

        let nothing = parse_episodes("I cannot help with that request today.", 3);
        assert!(nothing.value.is_empty());
        assert!(nothing.synthetic);
    }

    #[test]
    fn test_consistency_issue_text_filled_from_options() {
        let options = vec!["Option zero".to_string(), "Option one".to_string()];
        let parsed = parse_consistency_issues(
            r#"[{"plot_option_index": 1, "issue_type": "Timeline", "description": "Too early"}]"#,
            &options,
        );
        assert_eq!(parsed.value[0].plot_option_text.as_deref(), Some("Option one"));
        assert_eq!(parsed.value[0].severity, "warning");
    }

    #[test]
    fn test_consistency_labeled_text() {
        let options = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let text = "Issue 1: Character contradiction\n\
            Plot Option [2]: \"C\"\n\
            Severity: critical\n\
            Description: Asha cannot be in two places.\n\
            Suggestions:\n1. Move the scene\n2. Add a twin";
        let parsed = parse_consistency_issues(text, &options);
        assert_eq!(parsed.value.len(), 1);
        let issue = &parsed.value[0];
        assert_eq!(issue.issue_type, "Character contradiction");
        assert_eq!(issue.plot_option_index, Some(2));
        assert!(issue.is_critical());
        assert_eq!(issue.suggestions, vec!["Move the scene", "Add a twin"]);
    }

    #[test]
    fn test_consistency_parsing_error_placeholder() {
        let parsed = parse_consistency_issues("The moon is made of cheese and so on.", &[]);
        assert_eq!(parsed.value.len(), 1);
        assert_eq!(parsed.value[0].issue_type, "Parsing Error");
        assert!(parsed.value[0].synthetic);
        assert_eq!(parsed.value[0].suggestions.len(), 2);
    }

    #[test]
    fn test_improved_options_padded_and_truncated() {
        let parsed = parse_improved_options("1. A better storm arrives at dusk", 3);
        assert_eq!(parsed.value.len(), 3);
        assert_eq!(parsed.value[2], "Improved version of option 3");
        assert!(parsed.synthetic);

        let parsed = parse_improved_options(r#"["one", "two", "three"]"#, 2);
        assert_eq!(parsed.value, vec!["one", "two"]);
        assert!(!parsed.synthetic);
    }

    #[test]
    fn test_improved_options_with_bracketed_labels() {
        let text = "Plot Option [3]: The storm was foretold by the keeper's mother\n\
            Plot Option [5]: The twin returns on the supply boat";
        let parsed = parse_improved_options(text, 2);
        assert_eq!(
            parsed.value,
            vec![
                "The storm was foretold by the keeper's mother",
                "The twin returns on the supply boat"
            ]
        );
        assert_eq!(parsed.strategy, "labeled_sections");
        assert!(!parsed.synthetic);
    }

    #[test]
    fn test_plot_options_with_footnote_markers() {
        let text = "1. A ghost ship drifts into the harbor [1]\n\
            2. The keeper's diary names the killer\n\
            3. A storm traps the village for a week";
        let parsed = parse_plot_options(text, "general");
        assert_eq!(parsed.value.len(), 3);
        assert_eq!(parsed.value[0], "A ghost ship drifts into the harbor [1]");
        assert!(!parsed.synthetic);
    }

    #[test]
    fn test_outline_events_keep_bracketed_tags() {
        let parsed = parse_outline_events("1. The storm arrives [Act 1]\n2. The keeper finds a body [2]\n3. Confession");
        assert_eq!(
            parsed.value,
            vec!["The storm arrives [Act 1]", "The keeper finds a body [2]", "Confession"]
        );
    }

    #[test]
    fn test_improved_options_paragraph_fallback() {
        let text = "The keeper finds a second lighthouse.\n\nThe storm was summoned by the village.";
        let parsed = parse_improved_options(text, 2);
        assert_eq!(parsed.strategy, "paragraphs");
        assert!(!parsed.synthetic);
    }
}
