//! Resilient structured-text extraction.
//!
//! Model replies are asked for JSON but arrive as JSON, fenced JSON, JSON
//! buried in prose, labeled plain text, a "nothing found" sentence, or
//! garbage. [`Extractor::extract`] runs an ordered list of
//! [`ExtractionStrategy`] implementations against an [`ExtractionSchema`]
//! and never fails: when nothing parses, it returns placeholder records
//! flagged `synthetic`.
//!
//! ```
//! use kahani_extract::{ExtractionSchema, Extractor, FieldSpec};
//!
//! let schema = ExtractionSchema::list("characters")
//!     .with_field(FieldSpec::text("name").required())
//!     .with_field(FieldSpec::text("role"));
//!
//! let extraction = Extractor::new().extract(r#"[{"name": "Asha", "role": "Lead"}]"#, &schema);
//! assert!(!extraction.synthetic);
//! assert_eq!(extraction.records[0].text("name"), Some("Asha"));
//! ```
//!
//! Story-specific parsers built on top live in [`story`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extractor;
mod json;
mod labeled;
mod library;
mod record;
mod schema;
mod strategy;
pub mod story;

pub use extractor::{Extraction, Extractor};
pub use json::{extract_balanced, extract_from_code_block, extract_json};
pub use library::plot_twists;
pub use record::ExtractedRecord;
pub use schema::{Container, ExtractionSchema, FieldKind, FieldSpec, SectionBoundary};
pub use strategy::{
    EmbeddedJson, EmptySentinel, ExtractionStrategy, LabeledSections, Placeholder,
    WholeDocumentJson,
};
