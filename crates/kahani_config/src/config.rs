//! Configuration structures and the layered loader.

use config::{Config, Environment, File, FileFormat};
use kahani_core::PipelineStage;
use kahani_error::{ConfigError, KahaniError, KahaniResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../kahani.toml");

/// Model id per stage.
///
/// Ids containing `gpt` route to OpenAI, everything else to Groq.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Fallback for stages without their own entry
    pub default: String,
    /// Outline generation
    pub outline: Option<String>,
    /// Character development
    pub characters: Option<String>,
    /// Plot options and improved options
    pub plot: Option<String>,
    /// Consistency checking
    pub consistency: Option<String>,
    /// Episode split
    pub split: Option<String>,
    /// Episode lengthening
    pub enhance: Option<String>,
    /// Dialogue generation
    pub dialogue: Option<String>,
    /// Translation
    pub translate: Option<String>,
}

impl ModelsConfig {
    /// Model id configured for `stage`.
    pub fn for_stage(&self, stage: PipelineStage) -> &str {
        let specific = match stage {
            PipelineStage::Outline => self.outline.as_deref(),
            PipelineStage::Characters => self.characters.as_deref(),
            PipelineStage::Plot => self.plot.as_deref(),
            PipelineStage::Split => self.split.as_deref(),
            PipelineStage::Enhance => self.enhance.as_deref(),
            PipelineStage::Dialogue => self.dialogue.as_deref(),
            PipelineStage::Translate => self.translate.as_deref(),
            PipelineStage::Narrate | PipelineStage::Finalize => None,
        };
        specific.unwrap_or(&self.default)
    }

    /// Model id for the consistency checker.
    pub fn consistency(&self) -> &str {
        self.consistency.as_deref().unwrap_or(&self.default)
    }
}

/// Sampling defaults applied to every chat request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Request streamed responses
    #[serde(default)]
    pub streaming: bool,
    /// Cap on generated tokens
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Fan-out limits for per-episode and per-chunk work.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Concurrent model calls per fan-out
    pub max_concurrency: usize,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Optional pacing across a fan-out
    #[serde(default)]
    pub requests_per_minute: Option<u32>,
}

/// Translation chunking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationConfig {
    /// Largest chunk sent in one translation call, in characters
    pub max_chunk_chars: usize,
}

/// Text-to-speech.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpeechConfig {
    /// Speech model id
    pub model: String,
    /// Default voice
    pub voice: String,
    /// Audio container
    pub format: String,
    /// Longest text sent per request
    pub max_chars: usize,
}

/// Sequencer behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Revisions allowed per feedback loop
    pub max_refinements: usize,
    /// Root directory for run output
    pub output_dir: PathBuf,
}

/// Provider endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// OpenAI API base URL
    pub openai_base_url: String,
    /// Groq OpenAI-compatible base URL
    pub groq_base_url: String,
}

/// Top-level Kahani configuration.
///
/// # Example
///
/// ```no_run
/// use kahani_config::KahaniConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = KahaniConfig::load()?;
/// println!("Dispatch cap: {}", config.dispatch.max_concurrency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KahaniConfig {
    /// Model ids
    pub models: ModelsConfig,
    /// Sampling defaults
    pub generation: GenerationConfig,
    /// Fan-out limits
    pub dispatch: DispatchConfig,
    /// Translation chunking
    pub translation: TranslationConfig,
    /// Text-to-speech
    pub speech: SpeechConfig,
    /// Sequencer behaviour
    pub pipeline: PipelineConfig,
    /// Provider endpoints
    pub providers: ProvidersConfig,
}

/// Where [`KahaniConfig::load_layers`] looks for overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigLayers {
    /// Home directory config file
    pub home_file: Option<PathBuf>,
    /// Config file name resolved in the working directory, without extension
    pub local_name: Option<String>,
    /// Explicit environment map; `None` reads the process environment
    pub env: Option<config::Map<String, String>>,
}

impl ConfigLayers {
    /// The standard locations: `~/.config/kahani/kahani.toml`,
    /// `./kahani.toml`, process environment.
    pub fn standard() -> Self {
        Self {
            home_file: dirs::home_dir().map(|home| home.join(".config/kahani/kahani.toml")),
            local_name: Some("kahani".to_string()),
            env: None,
        }
    }
}

impl KahaniConfig {
    /// Load configuration from the standard layers.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the merged
    /// result fails validation.
    #[instrument]
    pub fn load() -> KahaniResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");
        Self::load_layers(&ConfigLayers::standard())
    }

    /// Bundled defaults only.
    pub fn bundled() -> KahaniResult<Self> {
        Self::load_layers(&ConfigLayers {
            env: Some(config::Map::new()),
            ..Default::default()
        })
    }

    /// Load configuration from explicit layers.
    #[instrument(skip(layers))]
    pub fn load_layers(layers: &ConfigLayers) -> KahaniResult<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = &layers.home_file {
            debug!(path = %home.display(), "Adding home config layer");
            builder = builder.add_source(File::from(home.clone()).required(false));
        }

        if let Some(name) = &layers.local_name {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let env = Environment::with_prefix("KAHANI")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(layers.env.clone());
        builder = builder.add_source(env);

        let config: Self = builder
            .build()
            .map_err(|e| {
                KahaniError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                KahaniError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        debug!(
            max_concurrency = config.dispatch.max_concurrency,
            max_refinements = config.pipeline.max_refinements,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a single file layered over the bundled defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> KahaniResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::new(format!(
                "Configuration file not found: {}",
                path.display()
            ))
            .into());
        }
        Self::load_layers(&ConfigLayers {
            home_file: Some(path.to_path_buf()),
            local_name: None,
            env: Some(config::Map::new()),
        })
    }

    fn validate(&self) -> KahaniResult<()> {
        if self.dispatch.max_concurrency == 0 {
            return Err(ConfigError::new("dispatch.max_concurrency must be at least 1").into());
        }
        if self.dispatch.timeout_secs == 0 {
            return Err(ConfigError::new("dispatch.timeout_secs must be at least 1").into());
        }
        if self.dispatch.requests_per_minute == Some(0) {
            return Err(ConfigError::new("dispatch.requests_per_minute must be positive").into());
        }
        if self.translation.max_chunk_chars == 0 {
            return Err(ConfigError::new("translation.max_chunk_chars must be at least 1").into());
        }
        if self.speech.max_chars == 0 {
            return Err(ConfigError::new("speech.max_chars must be at least 1").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_falls_back_to_default_model() {
        let config = KahaniConfig::bundled().unwrap();
        assert_eq!(config.models.for_stage(PipelineStage::Plot), "llama3-70b-8192");
        assert_eq!(config.models.for_stage(PipelineStage::Narrate), "gpt-4o-mini");
    }
}
