//! Model provider integrations for Kahani.
//!
//! - [`OpenAiDriver`] and [`GroqDriver`] share one OpenAI-compatible chat
//!   client with retry on transient failures.
//! - [`route_driver`] picks the provider from a model id.
//! - [`OpenAiSpeech`] implements text-to-speech.
//!
//! ```no_run
//! use kahani_config::{ApiKeys, KahaniConfig};
//! use kahani_interface::KahaniDriver;
//! use kahani_models::route_driver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KahaniConfig::load()?;
//! let driver = route_driver("llama3-70b-8192", &ApiKeys::from_env(), &config)?;
//! let reply = driver.complete("You write outlines.", "A haunted hotel").await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod groq;
mod openai;
mod openai_compat;
mod routing;
mod speech;

pub use groq::GroqDriver;
pub use openai::OpenAiDriver;
pub use openai_compat::{ClientSettings, ClientSettingsBuilder, OpenAiCompatibleClient};
pub use routing::{DEFAULT_GROQ_MODEL, Provider, resolve_route, route_driver};
pub use speech::OpenAiSpeech;
