//! Service configuration loaded from the environment.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_MAX_CHUNK_WORDS, DEFAULT_MIN_CHUNK_WORDS};

/// Global detector service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Base URL of the RuBERT model server
    pub rubert_url: String,

    /// Base URL of the GigaCheck model server
    pub gigacheck_url: String,

    /// Backend filling the guaranteed slot; must load at startup and
    /// serves as the fallback of last resort
    pub guaranteed_backend: String,

    /// Backend filling the preferred slot, tried first on each request
    /// while healthy. `None` disables the slot.
    pub preferred_backend: Option<String>,

    /// Decision threshold forwarded to the GigaCheck server
    pub gigacheck_threshold: f64,

    /// Lower bound on words per chunk
    pub min_chunk_words: usize,

    /// Upper bound on words per chunk
    pub max_chunk_words: usize,

    /// Timeout for model server requests in seconds
    pub request_timeout_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            rubert_url: "http://localhost:8001".to_string(),
            gigacheck_url: "http://localhost:8002".to_string(),
            guaranteed_backend: "rubert".to_string(),
            preferred_backend: Some("gigacheck".to_string()),
            gigacheck_threshold: 0.5,
            min_chunk_words: DEFAULT_MIN_CHUNK_WORDS,
            max_chunk_words: DEFAULT_MAX_CHUNK_WORDS,
            request_timeout_secs: 30,
        }
    }
}

impl DetectorConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults. Setting `PREFERRED_BACKEND`
    /// to an empty string or `none` disables the preferred slot entirely.
    pub fn from_env() -> Self {
        Self {
            rubert_url: std::env::var("RUBERT_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            gigacheck_url: std::env::var("GIGACHECK_URL")
                .unwrap_or_else(|_| "http://localhost:8002".to_string()),
            guaranteed_backend: std::env::var("GUARANTEED_BACKEND")
                .unwrap_or_else(|_| "rubert".to_string()),
            preferred_backend: match std::env::var("PREFERRED_BACKEND") {
                Ok(name) if name.is_empty() || name.eq_ignore_ascii_case("none") => None,
                Ok(name) => Some(name),
                Err(_) => Some("gigacheck".to_string()),
            },
            gigacheck_threshold: std::env::var("GIGACHECK_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.5),
            min_chunk_words: std::env::var("MIN_CHUNK_WORDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MIN_CHUNK_WORDS),
            max_chunk_words: std::env::var("MAX_CHUNK_WORDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CHUNK_WORDS),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}
