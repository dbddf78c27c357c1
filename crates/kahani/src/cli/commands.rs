//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use kahani_core::DialogueStyle;
use std::path::PathBuf;

/// Kahani - multi-stage story generation with language models
#[derive(Parser, Debug)]
#[command(name = "kahani")]
#[command(about = "Generate episodic stories, dialogue, translations and narration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a story from a topic
    Run(RunArgs),
}

/// Arguments of `kahani run`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Story topic or theme
    pub topic: String,

    /// Number of episodes, at least one
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub episodes: u32,

    /// Genre, e.g. general, ghost, sci-fi, mystery
    #[arg(long, default_value = "general")]
    pub story_type: String,

    /// Dialogue style: novel or drama
    #[arg(long, default_value = "novel")]
    pub style: DialogueStyle,

    /// Translate the final story into this language (repeatable)
    #[arg(long = "translate", value_name = "LANG")]
    pub languages: Vec<String>,

    /// Synthesize narration audio per episode
    #[arg(long)]
    pub narrate: bool,

    /// Check plot options for consistency and repair the inconsistent ones
    #[arg(long)]
    pub check_consistency: bool,

    /// Revision request for the outline (repeatable, applied in order)
    #[arg(long, value_name = "TEXT")]
    pub outline_feedback: Vec<String>,

    /// Revision request for the characters (repeatable, applied in order)
    #[arg(long, value_name = "TEXT")]
    pub character_feedback: Vec<String>,

    /// Output directory, overriding the configured one
    #[arg(long)]
    pub output: Option<PathBuf>,
}
