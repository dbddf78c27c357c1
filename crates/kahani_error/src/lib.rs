//! Error types for the Kahani story pipeline.
//!
//! Foundation error types shared by every crate in the workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! Parse failures of model output are deliberately absent: the extractor
//! resolves those locally with flagged placeholder records.
//!
//! # Examples
//!
//! ```
//! use kahani_error::{HttpError, KahaniResult};
//!
//! fn fetch_data() -> KahaniResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! assert!(fetch_data().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod dispatch;
mod error;
mod http;
mod models;
mod pipeline;
mod storage;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use dispatch::{DispatchError, DispatchErrorKind};
pub use error::{KahaniError, KahaniErrorKind, KahaniResult};
pub use http::HttpError;
pub use models::{ModelsError, ModelsErrorKind, ModelsResult, RetryableError};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use storage::{StorageError, StorageErrorKind};
