//! API keys from the environment.

use tracing::debug;

/// Provider API keys.
///
/// Keys are never read from TOML; only `OPENAI_API_KEY` and `GROQ_API_KEY`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    /// OpenAI key
    pub openai: Option<String>,
    /// Groq key
    pub groq: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("openai", &self.openai.as_ref().map(|_| "<redacted>"))
            .field("groq", &self.groq.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiKeys {
    /// Read keys from the process environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self {
            openai: non_empty(std::env::var("OPENAI_API_KEY").ok()),
            groq: non_empty(std::env::var("GROQ_API_KEY").ok()),
        }
    }

    /// True when at least one provider key is present.
    pub fn any(&self) -> bool {
        self.openai.is_some() || self.groq.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
