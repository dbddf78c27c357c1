//! Fatal pipeline errors.

/// Conditions that stop a story run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A stage produced no usable output
    #[display("Stage {} failed: {}", stage, reason)]
    StageFailed {
        /// Stage name
        stage: String,
        /// Why the stage output was rejected
        reason: String,
    },
    /// Feedback loop exceeded the configured number of revisions
    #[display("Stage {} exceeded {} refinements", stage, limit)]
    RefinementLimit {
        /// Stage name
        stage: String,
        /// Configured limit
        limit: usize,
    },
    /// A stage ran before the state it depends on was populated
    #[display("Stage {} is missing input: {}", stage, what)]
    MissingInput {
        /// Stage name
        stage: String,
        /// The missing piece of state
        what: String,
    },
}

/// Pipeline error with location tracking.
///
/// # Examples
///
/// ```
/// use kahani_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::StageFailed {
///     stage: "split".to_string(),
///     reason: "no episodes parsed".to_string(),
/// });
/// assert!(format!("{}", err).contains("no episodes parsed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
