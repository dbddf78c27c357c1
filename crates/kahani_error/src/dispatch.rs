//! Per-item dispatcher errors.
//!
//! A dispatch error belongs to exactly one work item; the dispatcher never
//! lets one failing item abort its siblings.

/// Why a single work item produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DispatchErrorKind {
    /// The unit call itself returned an error
    #[display("Unit call failed: {}", _0)]
    Unit(String),
    /// The unit call exceeded the per-call timeout
    #[display("Unit call timed out after {} ms", _0)]
    Timeout(u64),
    /// The unit call panicked
    #[display("Unit call panicked: {}", _0)]
    Panicked(String),
}

/// Dispatch error tagged with the index of the failed work item.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Dispatch Error: item {}: {} at line {} in {}", index, kind, line, file)]
pub struct DispatchError {
    /// Position of the failed item in the submitted sequence
    pub index: usize,
    /// The kind of failure
    pub kind: DispatchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DispatchError {
    /// Create a new dispatch error for the item at `index`.
    #[track_caller]
    pub fn new(index: usize, kind: DispatchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            index,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
