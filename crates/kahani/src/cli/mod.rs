//! Command-line interface for the kahani binary.

mod commands;
mod run;

pub use commands::{Cli, Commands, RunArgs};
pub use run::run_story;
