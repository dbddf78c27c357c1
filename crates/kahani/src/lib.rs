//! Kahani: multi-stage story generation with language models.
//!
//! A topic becomes an outline, characters, plot options, a set of
//! episodes, a long narrative and a dialogue script per episode, and
//! optionally translations and narration audio. Every run is written to
//! its own directory.
//!
//! # Architecture
//!
//! - `kahani_error` - Error types
//! - `kahani_core` - Requests, story records and run state
//! - `kahani_interface` - `KahaniDriver` and `SpeechSynthesizer` traits
//! - `kahani_config` - Layered configuration and API keys
//! - `kahani_models` - OpenAI and Groq drivers, speech
//! - `kahani_extract` - Structured data from free-form model output
//! - `kahani_dispatch` - Bounded parallel fan-out
//! - `kahani_pipeline` - Stages, sequencer and archives
//!
//! This crate re-exports everything and wires drivers from configuration.
//!
//! # Quick Start
//!
//! ```no_run
//! use kahani::{ApiKeys, FilesystemArchive, KahaniConfig, Sequencer, StoryRequest, stage_drivers};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KahaniConfig::load()?;
//! let keys = ApiKeys::from_env();
//! let drivers = stage_drivers(&config, &keys)?;
//! let archive = Arc::new(FilesystemArchive::new(&config.pipeline.output_dir));
//!
//! let request = StoryRequest::builder().topic("A clockmaker's apprentice").num_episodes(3u32).build()?;
//! let state = Sequencer::standard(drivers, None, archive, &config).run(request).await?;
//! println!("{} episodes, {} warnings", state.episodes.len(), state.warnings.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod setup;

pub use setup::{speech_backend, stage_drivers};

pub use kahani_config::{ApiKeys, ConfigLayers, KahaniConfig};
pub use kahani_core::{
    Character, ConsistencyIssue, DialogueStyle, EnhancedEpisode, Episode, GenerateRequest,
    GenerateResponse, Message, ModelResponse, Output, PipelineStage, Role, StoryRequest,
    StoryRequestBuilder, StoryState, init_tracing,
};
pub use kahani_dispatch::{DispatchOutcome, DispatchReport, Dispatcher, chunk_text, parallel_map};
pub use kahani_error::{KahaniError, KahaniErrorKind, KahaniResult};
pub use kahani_extract::{Extraction, ExtractionSchema, Extractor};
pub use kahani_interface::{KahaniDriver, SpeechSynthesizer};
pub use kahani_models::{GroqDriver, OpenAiDriver, OpenAiSpeech, route_driver};
pub use kahani_pipeline::{
    AcceptAll, ArchiveReceipt, Feedback, FeedbackSource, FilesystemArchive, InMemoryArchive,
    ScriptedFeedback, Sequencer, Stage, StageDrivers, StoryArchive,
};
