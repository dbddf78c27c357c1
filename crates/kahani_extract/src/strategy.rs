//! Extraction strategies, tried in priority order by [`crate::Extractor`].

use crate::json::{json_candidates, records_from_value};
use crate::labeled::{labeled_records, string_items};
use crate::record::ExtractedRecord;
use crate::schema::{Container, ExtractionSchema, FieldKind};

/// One way of turning reply text into records.
///
/// Returning `None` means "not applicable"; the extractor moves on to the
/// next strategy. Returned records are still validated against the
/// schema's required fields before being accepted.
pub trait ExtractionStrategy: Send + Sync {
    /// Strategy name, reported in [`crate::Extraction::strategy`].
    fn name(&self) -> &'static str;

    /// Try to produce records from `text`.
    fn attempt(&self, text: &str, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>>;
}

/// The whole reply is JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeDocumentJson;

impl ExtractionStrategy for WholeDocumentJson {
    fn name(&self) -> &'static str {
        "whole_document_json"
    }

    fn attempt(&self, text: &str, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>> {
        let value = serde_json::from_str(text.trim()).ok()?;
        records_from_value(&value, schema)
    }
}

/// JSON inside a code fence or surrounded by prose.
///
/// Each span is tried in turn; the first that maps onto the schema wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedJson;

impl ExtractionStrategy for EmbeddedJson {
    fn name(&self) -> &'static str {
        "embedded_json"
    }

    fn attempt(&self, text: &str, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>> {
        json_candidates(text).iter().find_map(|json| {
            let value = serde_json::from_str(json).ok()?;
            records_from_value(&value, schema)
        })
    }
}

/// Labeled plain text, or bulleted and quoted items for string lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledSections;

impl ExtractionStrategy for LabeledSections {
    fn name(&self) -> &'static str {
        "labeled_sections"
    }

    fn attempt(&self, text: &str, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>> {
        let records: Vec<ExtractedRecord> = match schema.container {
            Container::ListOfStrings => string_items(text, schema.min_item_len)
                .into_iter()
                .map(|item| {
                    let mut record = ExtractedRecord::new();
                    record.set_text("value", item);
                    record
                })
                .collect(),
            Container::List | Container::Single => labeled_records(text, schema),
        };
        (!records.is_empty()).then_some(records)
    }
}

/// A "nothing found" phrase means an empty result.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySentinel;

impl ExtractionStrategy for EmptySentinel {
    fn name(&self) -> &'static str {
        "empty_sentinel"
    }

    fn attempt(&self, text: &str, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>> {
        schema
            .sentinel
            .as_ref()
            .filter(|re| re.is_match(text))
            .map(|_| Vec::new())
    }
}

/// Last resort: flagged placeholder records.
///
/// Produces one record per expected slot, or the schema's generic fallback
/// record when no slot count is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placeholder;

impl ExtractionStrategy for Placeholder {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn attempt(&self, _text: &str, schema: &ExtractionSchema) -> Option<Vec<ExtractedRecord>> {
        if schema.expected == 0 && !schema.fallback.is_empty() {
            let mut record = ExtractedRecord::placeholder();
            for (name, value) in &schema.fallback {
                match schema.field(name).map(|f| f.kind) {
                    Some(FieldKind::List) => record.set_list(
                        name,
                        value.split('|').map(|s| s.trim().to_string()).collect(),
                    ),
                    _ => record.set_text(name, value.clone()),
                }
            }
            return Some(vec![record]);
        }

        let slots = schema.expected.max(1);
        let records = (1..=slots)
            .map(|slot| {
                let mut record = ExtractedRecord::placeholder();
                for field in &schema.fields {
                    let text = match (&field.placeholder, field.kind) {
                        (Some(text), _) => text.replace("{n}", &slot.to_string()),
                        (None, FieldKind::Text) if field.required => {
                            format!("Placeholder {} {}", field.name.replace('_', " "), slot)
                        }
                        _ => continue,
                    };
                    match field.kind {
                        FieldKind::List => record.set_list(
                            &field.name,
                            text.split('|').map(|s| s.trim().to_string()).collect(),
                        ),
                        FieldKind::Number | FieldKind::Index { .. } => {
                            if let Ok(n) = text.parse() {
                                record.set_number(&field.name, n);
                            }
                        }
                        FieldKind::Text => record.set_text(&field.name, text),
                    }
                }
                record
            })
            .collect();
        Some(records)
    }
}
