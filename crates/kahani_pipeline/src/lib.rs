//! Story generation stages and the sequencer that chains them.
//!
//! A run goes outline, characters, plot, split, enhance, dialogue,
//! translate, narrate, finalize. Every stage reads and writes one
//! [`kahani_core::StoryState`]; model calls go through
//! [`kahani_interface::KahaniDriver`], so tests can run the whole chain
//! against scripted drivers.
//!
//! # Example
//!
//! ```no_run
//! use kahani_pipeline::{InMemoryArchive, Sequencer, StageDrivers};
//! use kahani_config::KahaniConfig;
//! use kahani_core::StoryRequest;
//! use kahani_interface::KahaniDriver;
//! use std::sync::Arc;
//!
//! # async fn example(driver: Arc<dyn KahaniDriver>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = KahaniConfig::load()?;
//! let archive = Arc::new(InMemoryArchive::new());
//! let sequencer = Sequencer::standard(StageDrivers::uniform(driver), None, archive, &config);
//!
//! let request = StoryRequest::builder().topic("A lighthouse keeper's last winter").build()?;
//! let state = sequencer.run(request).await?;
//! println!("{} episodes", state.episodes.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod context;
mod feedback;
mod prompts;
mod sequencer;
mod stages;

pub use archive::{ArchiveReceipt, FilesystemArchive, InMemoryArchive, StoryArchive};
pub use context::{EpisodeContext, EpisodeContextBuilder, build_contexts};
pub use feedback::{AcceptAll, Feedback, FeedbackSource, ScriptedFeedback};
pub use sequencer::{Sequencer, StageDrivers};
pub use stages::{
    CharactersStage, ConsistencyChecker, DialogueStage, EnhanceStage, FinalizeStage, NarrateStage,
    OutlineStage, PlotStage, SplitStage, Stage, TranslateStage, auto_select_count,
};
