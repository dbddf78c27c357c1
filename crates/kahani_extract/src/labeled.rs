//! Plain-text parsing: section segmentation and labeled lines.

use crate::record::ExtractedRecord;
use crate::schema::{ExtractionSchema, FieldKind, FieldSpec, compile};
use regex::Regex;
use std::sync::LazyLock;

/// `Name: value`, tolerating bullets, numbering and markdown bold.
static LABEL_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"^\s*(?:[-*•]\s+)?(?:\d+[.)]\s+)?\**\s*([A-Za-z][A-Za-z _\-]{0,40}?)\s*\**\s*:\s*\**\s*(.*?)\s*$")
});

/// `1.`, `2)`, `### 3.` at the start of a line.
static NUMBERED_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"^\s*(?:#+\s*)?\**\s*\d+[.)]\**\s+(.*)$"));

/// A list item start: bullet, number, or `Option 2:` / `Plot Option [2]:`.
static ITEM_START: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?i)^\s*(?:[-*•]\s+|\d+[.)]\s*|(?:plot\s+)?option\s*\[?\d+\]?\s*[:.)\-]?\s*)(.*)$")
});

/// Leading list markup on a single item.
static ITEM_MARKUP: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"^[\d\-*.•)\s]+"));

static SINGLE_QUOTED: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"'(.*?)'"));

static DOUBLE_QUOTED: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r#""([^"]+)""#));

/// One plain-text record candidate.
#[derive(Debug, Default)]
struct Section {
    /// Started by a boundary or numbered marker.
    anchored: bool,
    captures: Vec<(String, String)>,
    lines: Vec<String>,
}

impl Section {
    fn anchored() -> Self {
        Self {
            anchored: true,
            ..Default::default()
        }
    }

    fn is_blank(&self) -> bool {
        self.captures.is_empty() && self.lines.iter().all(|l| l.trim().is_empty())
    }
}

/// Parse labeled records out of plain text.
pub(crate) fn labeled_records(text: &str, schema: &ExtractionSchema) -> Vec<ExtractedRecord> {
    let sections = match schema.container {
        crate::schema::Container::Single => vec![Section {
            anchored: true,
            lines: text.lines().map(str::to_string).collect(),
            ..Default::default()
        }],
        _ => segment(text, schema),
    };

    sections
        .into_iter()
        .filter(|s| !s.is_blank())
        .filter_map(|s| parse_section(&s, schema))
        .collect()
}

fn segment(text: &str, schema: &ExtractionSchema) -> Vec<Section> {
    if let Some(boundary) = &schema.boundary
        && text.lines().any(|l| boundary.pattern.is_match(l.trim()))
    {
        let mut sections = vec![Section::default()];
        for line in text.lines() {
            if let Some(caps) = boundary.pattern.captures(line.trim()) {
                let mut section = Section::anchored();
                for (i, name) in boundary.captures.iter().enumerate() {
                    if let Some(m) = caps.get(i + 1) {
                        let value = clean_value(m.as_str());
                        if !value.is_empty() {
                            section.captures.push((name.clone(), value));
                        }
                    }
                }
                sections.push(section);
            } else if let Some(current) = sections.last_mut() {
                current.lines.push(line.to_string());
            }
        }
        return sections;
    }

    if let Some(marker) = NUMBERED_MARKER.as_ref()
        && text.lines().any(|l| marker.is_match(l))
    {
        let mut sections = vec![Section::default()];
        for line in text.lines() {
            if let Some(caps) = marker.captures(line) {
                let mut section = Section::anchored();
                if let Some(rest) = caps.get(1) {
                    section.lines.push(rest.as_str().to_string());
                }
                sections.push(section);
            } else if let Some(current) = sections.last_mut() {
                current.lines.push(line.to_string());
            }
        }
        return sections;
    }

    let mut sections = Vec::new();
    let mut current = Section::default();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.lines.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
        } else {
            current.lines.push(line.to_string());
        }
    }
    if !current.lines.is_empty() {
        sections.push(current);
    }
    sections
}

/// Label values extend to the next recognised label.
fn parse_section(section: &Section, schema: &ExtractionSchema) -> Option<ExtractedRecord> {
    let mut labeled: Vec<(usize, Vec<String>)> = Vec::new();
    let mut loose: Vec<String> = Vec::new();
    let mut current: Option<usize> = None;

    for line in &section.lines {
        let label = LABEL_LINE.as_ref().and_then(|re| re.captures(line)).and_then(|caps| {
            let name = caps.get(1)?.as_str();
            let idx = schema.fields.iter().position(|f| f.matches_key(name))?;
            Some((idx, caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default()))
        });

        match label {
            Some((idx, value)) => {
                current = Some(idx);
                match labeled.iter_mut().find(|(i, _)| *i == idx) {
                    Some((_, parts)) => parts.push(value),
                    None => labeled.push((idx, vec![value])),
                }
            }
            None => match current {
                Some(idx) if !line.trim().is_empty() => {
                    if let Some((_, parts)) = labeled.iter_mut().find(|(i, _)| *i == idx) {
                        parts.push(line.clone());
                    }
                }
                Some(_) => {}
                None if !line.trim().is_empty() => loose.push(line.trim().to_string()),
                None => {}
            },
        }
    }

    if labeled.is_empty() && section.captures.is_empty() && !section.anchored {
        return None;
    }
    if labeled.is_empty() && section.captures.is_empty() && !has_fallbacks(schema) {
        return None;
    }

    let mut record = ExtractedRecord::new();
    for (idx, parts) in &labeled {
        let Some(field) = schema.fields.get(*idx) else {
            continue;
        };
        set_from_parts(&mut record, field, parts);
    }

    for (name, value) in &section.captures {
        if !record.has(name)
            && let Some(field) = schema.field(name)
        {
            set_from_parts(&mut record, field, std::slice::from_ref(value));
        }
    }

    let body_text = section.lines.join("\n");
    for field in &schema.fields {
        if record.has(&field.name) {
            continue;
        }
        if let Some(pattern) = &field.pattern
            && let Some(m) = pattern.captures(&body_text).and_then(|c| c.get(1))
        {
            set_from_parts(&mut record, field, &[m.as_str().to_string()]);
        }
    }

    let mut loose = loose.into_iter();
    let mut remaining: Vec<String> = Vec::new();
    if let Some(field) = schema.fields.iter().find(|f| f.headline) {
        if record.has(&field.name) {
            remaining.extend(loose.by_ref());
        } else if let Some(first) = loose.next() {
            record.set_text(&field.name, clean_value(&first));
        }
    }
    remaining.extend(loose);
    if let Some(field) = schema.fields.iter().find(|f| f.body)
        && !record.has(&field.name)
        && !remaining.is_empty()
    {
        record.set_text(&field.name, remaining.join("\n"));
    }

    (!record.values.is_empty()).then_some(record)
}

fn has_fallbacks(schema: &ExtractionSchema) -> bool {
    schema
        .fields
        .iter()
        .any(|f| f.headline || f.body || f.pattern.is_some())
}

fn set_from_parts(record: &mut ExtractedRecord, field: &FieldSpec, parts: &[String]) {
    match field.kind {
        FieldKind::Text => {
            let text = parts
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            let text = clean_value(&text);
            if !text.is_empty() {
                record.set_text(&field.name, text);
            }
        }
        FieldKind::Number | FieldKind::Index { .. } => {
            let digits: String = parts
                .iter()
                .flat_map(|p| p.chars())
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(n) = digits.parse() {
                record.set_number(&field.name, n);
            }
        }
        FieldKind::List => {
            let items: Vec<String> = parts.iter().flat_map(|p| split_list(p)).collect();
            if !items.is_empty() {
                record.set_list(&field.name, items);
            }
        }
    }
}

/// Split text into list items on newlines, bullets and numbering.
pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_markup)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Plain-text list of strings.
///
/// Tries a bracketed single-quoted list, then item lines (with continuation
/// lines appended), then double-quoted strings.
pub(crate) fn string_items(text: &str, min_len: usize) -> Vec<String> {
    let long_enough = |s: &String| s.chars().count() >= min_len;

    if let (Some(list), Some(quoted)) = (
        crate::json::extract_balanced(text, '[', ']'),
        SINGLE_QUOTED.as_ref(),
    ) {
        let items: Vec<String> = quoted
            .captures_iter(&list)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(long_enough)
            .collect();
        if !items.is_empty() {
            return items;
        }
    }

    let items: Vec<String> = item_lines(text).into_iter().filter(long_enough).collect();
    if !items.is_empty() {
        return items;
    }

    DOUBLE_QUOTED
        .as_ref()
        .map(|re| {
            re.captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(long_enough)
                .collect()
        })
        .unwrap_or_default()
}

fn item_lines(text: &str) -> Vec<String> {
    let Some(start) = ITEM_START.as_ref() else {
        return Vec::new();
    };

    let mut items: Vec<String> = Vec::new();
    let mut open = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            open = false;
            continue;
        }
        if let Some(rest) = start.captures(trimmed).and_then(|c| c.get(1)) {
            let item = clean_item(rest.as_str());
            if item.is_empty() || item.ends_with(':') {
                open = false;
                continue;
            }
            items.push(item);
            open = true;
        } else if open && let Some(last) = items.last_mut() {
            last.push(' ');
            last.push_str(&clean_item(trimmed));
        }
    }
    items
}

fn strip_markup(line: &str) -> String {
    let trimmed = line.trim();
    let stripped = ITEM_MARKUP
        .as_ref()
        .map(|re| re.replace(trimmed, "").into_owned())
        .unwrap_or_else(|| trimmed.to_string());
    clean_item(&stripped)
}

/// Strip list punctuation around an item. Brackets go only as an outer
/// pair, so a trailing tag like `[Act 1]` survives.
fn clean_item(item: &str) -> String {
    let item = item
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | ','))
        .trim();
    let unwrapped = item
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|inner| !inner.contains(['[', ']']));
    match unwrapped {
        Some(inner) => clean_item(inner),
        None => item.to_string(),
    }
}

/// Trim whitespace and stray markdown emphasis.
fn clean_value(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| c == '*' || c == '_' || c == '#')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn character_schema() -> ExtractionSchema {
        ExtractionSchema::list("characters")
            .with_field(FieldSpec::text("name").required())
            .with_field(FieldSpec::text("description"))
            .with_field(FieldSpec::text("role"))
    }

    #[test]
    fn test_numbered_labeled_sections() {
        let text = "Here are the characters:\n\n\
            1. Name: Asha\nDescription: A lighthouse keeper\nwho never sleeps.\nRole: Protagonist\n\n\
            2. **Name:** Ravi\n**Role:** Antagonist";
        let records = labeled_records(text, &character_schema());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("name"), Some("Asha"));
        assert_eq!(
            records[0].text("description"),
            Some("A lighthouse keeper\nwho never sleeps.")
        );
        assert_eq!(records[1].text("name"), Some("Ravi"));
        assert_eq!(records[1].text("role"), Some("Antagonist"));
    }

    #[test]
    fn test_unlabeled_preamble_is_dropped() {
        let text = "Sure, here you go.\n\nName: Asha\nRole: Lead";
        let records = labeled_records(text, &character_schema());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("name"), Some("Asha"));
    }

    #[test]
    fn test_boundary_captures_fill_fields() {
        let schema = ExtractionSchema::list("episodes")
            .with_field(FieldSpec::number("number"))
            .with_field(FieldSpec::text("title").headline())
            .with_field(FieldSpec::text("content").body())
            .boundary(r"(?i)^Episode\s+(\d+)\s*[:\-]\s*(.*)$", ["number", "title"]);
        let text = "Intro text\nEpisode 1: Fog\nThe fog rolls in.\nEpisode 2: Light\nThe lamp fails.";
        let records = labeled_records(text, &schema);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number("number"), Some(1));
        assert_eq!(records[0].text("title"), Some("Fog"));
        assert_eq!(records[1].text("content"), Some("The lamp fails."));
    }

    #[test]
    fn test_list_field_collects_items() {
        let schema = ExtractionSchema::single("issue")
            .with_field(FieldSpec::text("description"))
            .with_field(FieldSpec::list("suggestions").labels(["fixes"]));
        let text = "Description: Timeline clash\nFixes:\n1. Move the storm\n- Cut the flashback";
        let records = labeled_records(text, &schema);
        assert_eq!(
            records[0].list("suggestions"),
            vec!["Move the storm", "Cut the flashback"]
        );
    }

    #[test]
    fn test_string_items_python_literal() {
        let items = string_items("['The storm hits', 'The lamp fails']", 1);
        assert_eq!(items, vec!["The storm hits", "The lamp fails"]);
    }

    #[test]
    fn test_string_items_joins_continuation_lines() {
        let text = "Options:\n1. A ghost appears\n   in the mirror\n2) The keeper vanishes\n\nThanks!";
        let items = string_items(text, 10);
        assert_eq!(
            items,
            vec!["A ghost appears in the mirror", "The keeper vanishes"]
        );
    }

    #[test]
    fn test_string_items_option_prefixes() {
        let text = "Plot Option [3]: The sea gives back the drowned\nOption 4 - A letter arrives";
        let items = string_items(text, 1);
        assert_eq!(
            items,
            vec!["The sea gives back the drowned", "A letter arrives"]
        );
    }

    #[test]
    fn test_clean_item_keeps_trailing_tags() {
        assert_eq!(clean_item("The storm arrives [Act 1]"), "The storm arrives [Act 1]");
        assert_eq!(clean_item("\"[The lamp fails]\","), "The lamp fails");
        assert_eq!(clean_item("[Act 1] and [Act 2]"), "[Act 1] and [Act 2]");
    }

    #[test]
    fn test_string_items_quoted_fallback() {
        let text = r#"I suggest "a haunted lighthouse keeper" and "a storm that never ends"."#;
        let items = string_items(text, 10);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_string_items_gibberish_is_empty() {
        assert!(string_items("qwpeoiruty zxmcnvb", 10).is_empty());
    }
}
