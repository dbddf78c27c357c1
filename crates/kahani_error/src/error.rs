//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, DispatchError, HttpError, ModelsError, PipelineError, StorageError,
};

/// Every error a Kahani operation can surface.
///
/// # Examples
///
/// ```
/// use kahani_error::{KahaniError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: KahaniError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum KahaniErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Model provider error
    #[from(ModelsError)]
    Models(ModelsError),
    /// Per-item dispatch error
    #[from(DispatchError)]
    Dispatch(DispatchError),
    /// Fatal pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Kahani error with kind discrimination.
///
/// # Examples
///
/// ```
/// use kahani_error::{KahaniResult, ConfigError};
///
/// fn might_fail() -> KahaniResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Kahani Error: {}", _0)]
pub struct KahaniError(Box<KahaniErrorKind>);

impl KahaniError {
    /// Create a new error from a kind.
    pub fn new(kind: KahaniErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &KahaniErrorKind {
        &self.0
    }

    /// True when the error came from a model provider and is worth retrying.
    pub fn is_retryable(&self) -> bool {
        use crate::RetryableError;
        match self.kind() {
            KahaniErrorKind::Models(e) => e.is_retryable(),
            KahaniErrorKind::Http(_) => true,
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to KahaniErrorKind
impl<T> From<T> for KahaniError
where
    T: Into<KahaniErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Kahani operations.
pub type KahaniResult<T> = std::result::Result<T, KahaniError>;
