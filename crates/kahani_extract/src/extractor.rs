//! Runs the strategy chain and validates candidates.

use crate::record::ExtractedRecord;
use crate::schema::{ExtractionSchema, FieldKind};
use crate::strategy::{
    EmbeddedJson, EmptySentinel, ExtractionStrategy, LabeledSections, Placeholder,
    WholeDocumentJson,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Result of one extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Accepted records, possibly empty
    pub records: Vec<ExtractedRecord>,
    /// Name of the strategy that produced them
    pub strategy: &'static str,
    /// True when any record is a placeholder
    pub synthetic: bool,
}

/// Ordered chain of extraction strategies.
///
/// The first strategy whose candidate passes validation wins. The default
/// chain ends with [`Placeholder`], so extraction always yields a result.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Default chain: whole-document JSON, embedded JSON, labeled sections,
    /// empty sentinel, placeholder.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(WholeDocumentJson),
                Box::new(EmbeddedJson),
                Box::new(LabeledSections),
                Box::new(EmptySentinel),
                Box::new(Placeholder),
            ],
        }
    }

    /// Custom chain. A [`Placeholder`] is appended when the chain lacks one.
    pub fn with_strategies(mut strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        if !strategies.iter().any(|s| s.name() == Placeholder.name()) {
            strategies.push(Box::new(Placeholder));
        }
        Self { strategies }
    }

    /// Extract records from `text`. Never fails.
    pub fn extract(&self, text: &str, schema: &ExtractionSchema) -> Extraction {
        for strategy in &self.strategies {
            let Some(mut records) = strategy.attempt(text, schema) else {
                continue;
            };

            for record in &mut records {
                normalize(record, schema);
            }

            if !records.iter().all(|r| r.synthetic || is_complete(r, schema)) {
                debug!(
                    schema = schema.name(),
                    strategy = strategy.name(),
                    "Discarding candidate with missing required fields"
                );
                continue;
            }

            let synthetic = records.iter().any(|r| r.synthetic);
            if synthetic {
                warn!(
                    schema = schema.name(),
                    count = records.len(),
                    response_length = text.len(),
                    "Could not parse model reply, using placeholders"
                );
            } else {
                debug!(
                    schema = schema.name(),
                    strategy = strategy.name(),
                    count = records.len(),
                    "Extracted records"
                );
            }

            return Extraction {
                records,
                strategy: strategy.name(),
                synthetic,
            };
        }

        // Only reachable with a chain whose placeholder declined
        Extraction {
            records: Vec::new(),
            strategy: Placeholder.name(),
            synthetic: true,
        }
    }
}

/// Apply defaults and bring index fields into range.
fn normalize(record: &mut ExtractedRecord, schema: &ExtractionSchema) {
    for field in &schema.fields {
        if let FieldKind::Index { len } = field.kind
            && let Some(value) = record.number(&field.name)
        {
            match clamp_index(value, len) {
                Some(index) => record.set_number(&field.name, index),
                None => {
                    debug!(field = %field.name, value, len, "Dropping out-of-range index");
                    record.remove(&field.name);
                }
            }
        }

        if !record.has(&field.name)
            && let Some(default) = &field.default
        {
            record.set_text(&field.name, default.clone());
        }
    }
}

/// In range as given, else as a 1-based value, else nothing.
fn clamp_index(value: u64, len: usize) -> Option<u64> {
    let len = len as u64;
    if value < len {
        Some(value)
    } else if value >= 1 && value - 1 < len {
        Some(value - 1)
    } else {
        None
    }
}

fn is_complete(record: &ExtractedRecord, schema: &ExtractionSchema) -> bool {
    schema
        .fields
        .iter()
        .filter(|f| f.required)
        .all(|f| record.has(&f.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(0, 3), Some(0));
        assert_eq!(clamp_index(2, 3), Some(2));
        assert_eq!(clamp_index(3, 3), Some(2));
        assert_eq!(clamp_index(4, 3), None);
        assert_eq!(clamp_index(0, 0), None);
    }
}
