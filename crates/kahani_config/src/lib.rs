//! Layered configuration for the Kahani story pipeline.
//!
//! One [`KahaniConfig`] is built at startup and passed by reference to
//! everything that needs it. Sources, later ones winning:
//! 1. Bundled defaults (`kahani.toml` shipped with this crate)
//! 2. `~/.config/kahani/kahani.toml`
//! 3. `./kahani.toml`
//! 4. `KAHANI_<SECTION>__<KEY>` environment variables

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod keys;

pub use config::{
    ConfigLayers, DispatchConfig, GenerationConfig, KahaniConfig, ModelsConfig, PipelineConfig,
    ProvidersConfig, SpeechConfig, TranslationConfig,
};
pub use keys::ApiKeys;
