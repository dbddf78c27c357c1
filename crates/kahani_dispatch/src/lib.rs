//! Bounded parallel fan-out with ordered fan-in.
//!
//! [`parallel_map`] and [`Dispatcher::run`] apply an async unit function to
//! every work item with at most `cap` calls in flight, and return one
//! [`DispatchOutcome`] per item in submission order. A failing, timed-out
//! or panicking item only affects its own outcome.
//!
//! [`chunk_text`] splits long text on paragraph boundaries so it can be
//! fanned out in pieces.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod dispatcher;
mod report;

pub use chunk::chunk_text;
pub use dispatcher::{DispatchOutcome, Dispatcher, parallel_map};
pub use report::DispatchReport;
