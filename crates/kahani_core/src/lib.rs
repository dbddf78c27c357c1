//! Core data types for the Kahani story pipeline.
//!
//! Chat messages and requests exchanged with model drivers, the story
//! records every stage produces, and the per-run [`StoryState`] that
//! accumulates them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod request;
mod role;
mod stage;
mod state;
mod story;
mod telemetry;

pub use message::{Message, MessageBuilder};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, ModelResponse, Output};
pub use role::Role;
pub use stage::PipelineStage;
pub use state::{StoryRequest, StoryRequestBuilder, StoryState};
pub use story::{Character, ConsistencyIssue, DialogueStyle, EnhancedEpisode, Episode};
pub use telemetry::init_tracing;
