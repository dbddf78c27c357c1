//! Trait definitions at the model and speech seams.
//!
//! Stages only ever see [`KahaniDriver`] and [`SpeechSynthesizer`]; the
//! provider crates implement them and tests swap in mocks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{KahaniDriver, SpeechSynthesizer};
