//! Declarative description of what a reply should contain.

use regex::Regex;
use tracing::warn;

/// Compile a pattern, logging and discarding it when invalid.
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern, error = %e, "Ignoring invalid extraction pattern");
            None
        }
    }
}

/// Shape of the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    /// One record
    Single,
    /// A list of records with named fields
    #[default]
    List,
    /// A list of plain strings; each record has one field, `value`
    ListOfStrings,
}

/// Type of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Free text
    #[default]
    Text,
    /// Non-negative integer
    Number,
    /// Index into a sequence of `len` items; out-of-range values are
    /// shifted from 1-based or dropped
    Index {
        /// Length of the indexed sequence
        len: usize,
    },
    /// List of strings
    List,
}

/// One named field of a record.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) required: bool,
    pub(crate) labels: Vec<String>,
    pub(crate) default: Option<String>,
    pub(crate) pattern: Option<Regex>,
    pub(crate) headline: bool,
    pub(crate) body: bool,
    pub(crate) placeholder: Option<String>,
}

impl FieldSpec {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            labels: vec![name.replace('_', " ")],
            default: None,
            pattern: None,
            headline: false,
            body: false,
            placeholder: None,
        }
    }

    /// Free-text field.
    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Integer field.
    pub fn number(name: &str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    /// Index into a sequence of `len` items.
    pub fn index(name: &str, len: usize) -> Self {
        Self::new(name, FieldKind::Index { len })
    }

    /// List-of-strings field.
    pub fn list(name: &str) -> Self {
        Self::new(name, FieldKind::List)
    }

    /// Records missing this field (after defaults) are invalid.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Extra labels and JSON keys accepted for this field, matched
    /// case-insensitively.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Value used when the reply omits the field.
    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    /// Unlabeled fallback for plain-text sections; capture group 1 is the value.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = compile(pattern);
        self
    }

    /// Fall back to the section's first line when unlabeled.
    pub fn headline(mut self) -> Self {
        self.headline = true;
        self
    }

    /// Fall back to the section's unlabeled lines when unlabeled.
    pub fn body(mut self) -> Self {
        self.body = true;
        self
    }

    /// Placeholder text; `{n}` is replaced by the 1-based slot. List fields
    /// split the text on `|`.
    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub(crate) fn matches_key(&self, key: &str) -> bool {
        let key = key.trim().to_lowercase().replace(['_', '-'], " ");
        self.name.replace('_', " ").eq_ignore_ascii_case(&key)
            || self.labels.iter().any(|l| l.eq_ignore_ascii_case(&key))
    }
}

/// Plain-text record boundary, e.g. `Episode 3: The Storm`.
///
/// Capture groups, in order, fill the named fields.
#[derive(Debug, Clone)]
pub struct SectionBoundary {
    pub(crate) pattern: Regex,
    pub(crate) captures: Vec<String>,
}

impl SectionBoundary {
    /// Boundary whose capture groups fill `captures` in order.
    ///
    /// Returns `None` when the pattern does not compile.
    pub fn new<I, S>(pattern: &str, captures: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Some(Self {
            pattern: compile(pattern)?,
            captures: captures.into_iter().map(Into::into).collect(),
        })
    }
}

/// What a reply is expected to contain.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSchema {
    pub(crate) name: String,
    pub(crate) container: Container,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) wrapper_keys: Vec<String>,
    pub(crate) sentinel: Option<Regex>,
    pub(crate) boundary: Option<SectionBoundary>,
    pub(crate) expected: usize,
    pub(crate) min_item_len: usize,
    pub(crate) fallback: Vec<(String, String)>,
}

impl ExtractionSchema {
    fn new(name: &str, container: Container) -> Self {
        Self {
            name: name.to_string(),
            container,
            min_item_len: 1,
            ..Default::default()
        }
    }

    /// Expect a list of records.
    pub fn list(name: &str) -> Self {
        Self::new(name, Container::List)
    }

    /// Expect a single record.
    pub fn single(name: &str) -> Self {
        Self::new(name, Container::Single)
    }

    /// Expect a list of strings.
    pub fn strings(name: &str) -> Self {
        Self::new(name, Container::ListOfStrings).with_field(FieldSpec::text("value").required())
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Object keys that may wrap the records, e.g. `{"episodes": [...]}`.
    pub fn wrapped_in<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wrapper_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Phrase meaning "no records", matched anywhere in the reply.
    pub fn sentinel(mut self, pattern: &str) -> Self {
        self.sentinel = compile(pattern);
        self
    }

    /// Plain-text record boundary; capture groups fill `captures` in order.
    pub fn boundary<I, S>(mut self, pattern: &str, captures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boundary = SectionBoundary::new(pattern, captures);
        self
    }

    /// Number of placeholder slots produced when nothing parses.
    pub fn expect_records(mut self, count: usize) -> Self {
        self.expected = count;
        self
    }

    /// Shortest plain-text list item accepted, in characters.
    pub fn min_item_len(mut self, len: usize) -> Self {
        self.min_item_len = len;
        self
    }

    /// Field values of the single generic placeholder produced when no
    /// slot count is expected.
    pub fn fallback_record<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.fallback = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Schema name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected container.
    pub fn container(&self) -> Container {
        self.container
    }

    /// Declared fields.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub(crate) fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn is_wrapper_key(&self, key: &str) -> bool {
        self.wrapper_keys.iter().any(|k| k.eq_ignore_ascii_case(key))
    }
}
