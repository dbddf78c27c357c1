//! Pulling JSON out of model replies and mapping it onto a schema.
//!
//! Replies often wrap JSON in markdown fences or surround it with prose.
//! The helpers here find the JSON text; [`records_from_value`] maps a parsed
//! value onto the schema's container shape.

use crate::record::ExtractedRecord;
use crate::schema::{Container, ExtractionSchema, FieldKind, FieldSpec};
use serde_json::{Map, Value};

/// Openers tried when scanning a reply for JSON spans.
const MAX_JSON_SCANS: usize = 64;

/// Find JSON text in a reply.
///
/// Tries, in order:
/// 1. Markdown code blocks: ```json ... ```
/// 2. The first balanced `[...]` or `{...}`, whichever opens first
///
/// # Examples
///
/// ```
/// use kahani_extract::extract_json;
///
/// let reply = "Here you go:\n```json\n{\"id\": 7}\n```\nEnjoy!";
/// assert_eq!(extract_json(reply).as_deref(), Some("{\"id\": 7}"));
/// ```
pub fn extract_json(response: &str) -> Option<String> {
    json_candidates(response).into_iter().next()
}

/// Every JSON-looking span of a reply, in the order [`extract_json`] ranks them.
///
/// The code block comes first, then each top-level balanced `[...]` or
/// `{...}` in the order it opens. Spans nested inside an earlier span are
/// not repeated.
pub(crate) fn json_candidates(response: &str) -> Vec<String> {
    let mut candidates: Vec<String> = extract_from_code_block(response, "json")
        .filter(|block| !block.is_empty())
        .into_iter()
        .collect();

    let mut from = 0;
    for _ in 0..MAX_JSON_SCANS {
        let Some(offset) = response[from..].find(|c: char| c == '[' || c == '{') else {
            break;
        };
        let start = from + offset;
        let (open, close) = if response[start..].starts_with('[') {
            ('[', ']')
        } else {
            ('{', '}')
        };
        match balanced_end(response, start, open, close) {
            Some(end) => {
                let span = &response[start..end];
                if !candidates.iter().any(|c| c == span) {
                    candidates.push(span.to_string());
                }
                from = end;
            }
            None => from = start + 1,
        }
    }
    candidates
}

/// Extract the contents of a markdown code block.
///
/// Prefers a block tagged with `language`, then any fenced block. A missing
/// closing fence (truncated reply) yields everything after the opening one.
pub fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        return match response[content_start..].find("```") {
            Some(end) => Some(response[content_start..content_start + end].trim().to_string()),
            None => Some(response[content_start..].trim().to_string()),
        };
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip an unknown language tag
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    match response[skip_to..].find("```") {
        Some(end) => Some(response[skip_to..skip_to + end].trim().to_string()),
        None => Some(response[skip_to..].trim().to_string()),
    }
}

/// Extract the first substring between balanced `open` and `close`.
///
/// Delimiters inside double-quoted strings are ignored, as are escaped
/// quotes.
pub fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let end = balanced_end(response, start, open, close)?;
    Some(response[start..end].to_string())
}

/// Byte offset just past the `close` matching the `open` at `start`.
fn balanced_end(response: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// Map a parsed JSON value onto the schema's container.
///
/// Returns `None` when the value has the wrong shape.
pub(crate) fn records_from_value(value: &Value, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>> {
    match schema.container {
        Container::ListOfStrings => strings_from_value(value, schema),
        Container::List => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_object().map(|obj| record_from_object(obj, schema)))
                .collect(),
            Value::Object(obj) => match unwrap_object(obj, schema) {
                Some(inner) => records_from_value(inner, schema),
                None if looks_like_record(obj, schema) => Some(vec![record_from_object(obj, schema)]),
                None => None,
            },
            _ => None,
        },
        Container::Single => match value {
            Value::Object(obj) => match unwrap_object(obj, schema) {
                Some(Value::Object(inner)) => Some(vec![record_from_object(inner, schema)]),
                _ => Some(vec![record_from_object(obj, schema)]),
            },
            Value::Array(items) => match items.as_slice() {
                [Value::Object(obj)] => Some(vec![record_from_object(obj, schema)]),
                _ => None,
            },
            _ => None,
        },
    }
}

/// Every item must be a string of at least `min_item_len` characters;
/// anything else means the span was a label or footnote, not the list.
fn strings_from_value(value: &Value, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let text = match item {
                    Value::String(s) => s.trim(),
                    Value::Object(obj) => obj.values().find_map(Value::as_str)?.trim(),
                    _ => return None,
                };
                if text.chars().count() < schema.min_item_len {
                    return None;
                }
                let mut record = ExtractedRecord::new();
                record.set_text("value", text);
                Some(record)
            })
            .collect(),
        Value::Object(obj) => strings_from_value(unwrap_object(obj, schema)?, schema),
        _ => None,
    }
}

/// The value stored under a wrapper key, or the only array in the object.
fn unwrap_object<'a>(obj: &'a Map<String, Value>, schema: &ExtractionSchema) -> Option<&'a Value> {
    if let Some((_, inner)) = obj.iter().find(|(k, _)| schema.is_wrapper_key(k)) {
        return Some(inner);
    }
    let mut arrays = obj.values().filter(|v| v.is_array());
    match (arrays.next(), arrays.next()) {
        (Some(only), None) if !looks_like_record(obj, schema) => Some(only),
        _ => None,
    }
}

fn looks_like_record(obj: &Map<String, Value>, schema: &ExtractionSchema) -> bool {
    obj.keys()
        .any(|k| schema.fields.iter().any(|f| f.kind != FieldKind::List && f.matches_key(k)))
}

fn record_from_object(obj: &Map<String, Value>, schema: &ExtractionSchema) -> ExtractedRecord {
    let mut record = ExtractedRecord::new();
    for field in &schema.fields {
        let Some((_, value)) = obj.iter().find(|(k, _)| field.matches_key(k)) else {
            continue;
        };
        set_from_json(&mut record, field, value);
    }
    record
}

fn set_from_json(record: &mut ExtractedRecord, field: &FieldSpec, value: &Value) {
    match field.kind {
        FieldKind::Text => {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("\n"),
                Value::Null | Value::Object(_) => return,
            };
            record.set_text(&field.name, text);
        }
        FieldKind::Number | FieldKind::Index { .. } => {
            if let Some(n) = json_number(value) {
                record.set_number(&field.name, n);
            }
        }
        FieldKind::List => {
            let items = match value {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.trim().to_string()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .filter(|s| !s.is_empty())
                    .collect(),
                Value::String(s) => crate::labeled::split_list(s),
                _ => return,
            };
            record.set_list(&field.name, items);
        }
    }
}

fn json_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('#')
            .trim_matches(|c| c == '[' || c == ']')
            .parse()
            .ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_with_language() {
        let reply = "Sure!\n```json\n[1, 2]\n```";
        assert_eq!(extract_from_code_block(reply, "json").as_deref(), Some("[1, 2]"));
    }

    #[test]
    fn test_code_block_without_closing_fence() {
        let reply = "```json\n{\"a\": 1}";
        assert_eq!(extract_from_code_block(reply, "json").as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_bare_code_block_skips_tag() {
        let reply = "```javascript\n{\"a\": 1}\n```";
        assert_eq!(extract_from_code_block(reply, "json").as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_balanced_ignores_brackets_in_strings() {
        let reply = r#"Result: {"text": "a } b \" }", "n": [1]} trailing"#;
        assert_eq!(
            extract_balanced(reply, '{', '}').as_deref(),
            Some(r#"{"text": "a } b \" }", "n": [1]}"#)
        );
    }

    #[test]
    fn test_extract_json_prefers_first_opener() {
        let reply = r#"Events: ["a", "b"] and {"x": 1}"#;
        assert_eq!(extract_json(reply).as_deref(), Some(r#"["a", "b"]"#));
    }

    #[test]
    fn test_unbalanced_returns_none() {
        assert!(extract_balanced("[1, 2", '[', ']').is_none());
        assert!(extract_json("no json here").is_none());
    }

    #[test]
    fn test_candidates_follow_opening_order() {
        let reply = "Option [3]: first\nOption [5]: second\nFinal: [\"a\", \"b\"] {\"x\": [1]}";
        assert_eq!(
            json_candidates(reply),
            vec!["[3]", "[5]", r#"["a", "b"]"#, r#"{"x": [1]}"#]
        );
    }

    #[test]
    fn test_candidates_continue_past_unparseable_code_block() {
        let reply = "Notes:\n```text\nkeep it short\n```\nAnswer: [\"one\", \"two\"]";
        let candidates = json_candidates(reply);
        assert_eq!(candidates[0], "keep it short");
        assert_eq!(candidates[1], r#"["one", "two"]"#);
    }

    #[test]
    fn test_candidates_skip_unbalanced_opener() {
        let reply = "Broken { here, then [1, 2]";
        assert_eq!(json_candidates(reply), vec!["[1, 2]"]);
    }

    #[test]
    fn test_string_list_rejects_numbers_and_short_items() {
        let schema = ExtractionSchema::strings("plot_options").min_item_len(10);
        let numbers: Value = serde_json::from_str("[3]").unwrap();
        assert!(records_from_value(&numbers, &schema).is_none());

        let short: Value = serde_json::from_str(r#"["A ghost ship drifts in", "tbd"]"#).unwrap();
        assert!(records_from_value(&short, &schema).is_none());

        let good: Value = serde_json::from_str(r#"["A ghost ship drifts in"]"#).unwrap();
        assert_eq!(records_from_value(&good, &schema).unwrap().len(), 1);
    }

    #[test]
    fn test_wrapped_list_is_unwrapped() {
        let schema = ExtractionSchema::list("characters")
            .with_field(FieldSpec::text("name"))
            .wrapped_in(["characters"]);
        let value: Value = serde_json::from_str(r#"{"characters": [{"Name": "Asha"}]}"#).unwrap();
        let records = records_from_value(&value, &schema).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("name"), Some("Asha"));
    }

    #[test]
    fn test_list_of_non_objects_is_rejected() {
        let schema = ExtractionSchema::list("characters").with_field(FieldSpec::text("name"));
        let value: Value = serde_json::from_str(r#"["Asha", "Ravi"]"#).unwrap();
        assert!(records_from_value(&value, &schema).is_none());
    }

    #[test]
    fn test_numeric_strings_become_numbers() {
        let schema = ExtractionSchema::list("issues").with_field(FieldSpec::index("plot_option_index", 5));
        let value: Value = serde_json::from_str(r#"[{"plot_option_index": "2"}]"#).unwrap();
        let records = records_from_value(&value, &schema).unwrap();
        assert_eq!(records[0].index("plot_option_index"), Some(2));
    }
}
