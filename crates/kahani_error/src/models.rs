//! Model provider errors and retry classification.

/// Model provider error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ModelsErrorKind {
    /// Request never produced a response (connection, TLS, body read)
    #[display("HTTP transport failed: {}", _0)]
    Http(String),

    /// Provider answered with a non-success status
    #[display("API returned HTTP {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Provider throttled the request (HTTP 429)
    #[display("Rate limited: {}", _0)]
    RateLimit(String),

    /// Credentials rejected (HTTP 401/403)
    #[display("Authentication failed: {}", _0)]
    Authentication(String),

    /// API key environment variable not set
    #[display("{} environment variable not set", _0)]
    MissingApiKey(String),

    /// Response body did not have the expected shape
    #[display("Failed to parse provider response: {}", _0)]
    ResponseParsing(String),

    /// Builder error (derive_builder failures)
    #[display("Builder error: {}", _0)]
    Builder(String),
}

impl ModelsErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelsErrorKind::Http(_) | ModelsErrorKind::RateLimit(_) => true,
            ModelsErrorKind::Api { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            ModelsErrorKind::RateLimit(_) => (5000, 3, 40),
            ModelsErrorKind::Api { status, .. } => match *status {
                429 => (5000, 3, 40),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            ModelsErrorKind::Http(_) => (1000, 3, 10),
            _ => (2000, 5, 60),
        }
    }

    /// Classify a non-success HTTP status into an error kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use kahani_error::ModelsErrorKind;
    ///
    /// assert!(matches!(ModelsErrorKind::from_status(429, "slow down"), ModelsErrorKind::RateLimit(_)));
    /// assert!(matches!(ModelsErrorKind::from_status(401, "bad key"), ModelsErrorKind::Authentication(_)));
    /// assert!(matches!(ModelsErrorKind::from_status(503, "busy"), ModelsErrorKind::Api { status: 503, .. }));
    /// ```
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => ModelsErrorKind::RateLimit(message),
            401 | 403 => ModelsErrorKind::Authentication(message),
            _ => ModelsErrorKind::Api { status, message },
        }
    }
}

/// Model provider error with location tracking.
///
/// # Examples
///
/// ```
/// use kahani_error::{ModelsError, ModelsErrorKind, RetryableError};
///
/// let err = ModelsError::new(ModelsErrorKind::Api {
///     status: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, _max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 2000);
/// assert_eq!(retries, 5);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Models Error: {} at {}:{}", kind, file, line)]
pub struct ModelsError {
    /// The specific error kind
    pub kind: ModelsErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// Source file where error occurred
    pub file: &'static str,
}

impl ModelsError {
    /// Create a new models error.
    #[track_caller]
    pub fn new(kind: ModelsErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// Lets an error say whether it should trigger a retry and which backoff
/// parameters to use.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503, 429 or dropped connections return true.
    /// Permanent errors like 401 or 400 return false.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for ModelsError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}

/// Result type for model operations.
pub type ModelsResult<T> = Result<T, ModelsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_and_bad_request_are_permanent() {
        assert!(!ModelsErrorKind::from_status(401, "nope").is_retryable());
        assert!(!ModelsErrorKind::from_status(400, "bad").is_retryable());
        assert!(!ModelsErrorKind::MissingApiKey("GROQ_API_KEY".into()).is_retryable());
    }

    #[test]
    fn test_transient_failures_are_retryable() {
        assert!(ModelsErrorKind::from_status(429, "slow").is_retryable());
        assert!(ModelsErrorKind::from_status(502, "gateway").is_retryable());
        assert!(ModelsErrorKind::Http("connection reset".into()).is_retryable());
    }

    #[test]
    fn test_missing_key_display_names_variable() {
        let err = ModelsError::new(ModelsErrorKind::MissingApiKey("OPENAI_API_KEY".into()));
        assert!(err.to_string().contains("OPENAI_API_KEY environment variable not set"));
    }
}
