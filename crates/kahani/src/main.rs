//! Kahani CLI binary.
//!
//! Generates a story from a topic and writes every artifact of the run to
//! the output directory.

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, run_story};

    let cli = Cli::parse();
    kahani::init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Run(args) => match run_story(args).await {
            Ok(state) => {
                for warning in &state.warnings {
                    tracing::warn!(%warning, "Absorbed failure");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Story generation failed");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
