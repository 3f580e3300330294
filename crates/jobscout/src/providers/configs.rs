use std::env;
use std::time::Duration;

use crate::errors::{ProviderError, ProviderResult};

pub const GROQ_HOST: &str = "https://api.groq.com/openai";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";

pub const GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-1.5-flash-8b";

/// How long the Gemini adapter waits before its single rate-limit retry.
pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

pub struct GroqProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl GroqProviderConfig {
    pub fn new(host: String, api_key: String) -> Self {
        Self {
            host,
            api_key,
            model: GROQ_MODEL.to_string(),
            temperature: Some(0.1),
            max_tokens: Some(4096),
        }
    }

    /// Build from GROQ_API_KEY; a missing credential is an auth failure.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = env::var("GROQ_API_KEY")
            .map_err(|_| ProviderError::Auth("GROQ_API_KEY not set".to_string()))?;
        Ok(Self::new(GROQ_HOST.to_string(), api_key))
    }
}

pub struct GeminiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    /// Cool-down before the one adapter-local retry on a rate limit.
    /// Kept configurable so tests do not sleep for a minute.
    pub retry_cooldown: Duration,
}

impl GeminiProviderConfig {
    pub fn new(host: String, api_key: String) -> Self {
        Self {
            host,
            api_key,
            model: GEMINI_MODEL.to_string(),
            retry_cooldown: RATE_LIMIT_COOLDOWN,
        }
    }

    /// Build from GEMINI_API_KEY; a missing credential is an auth failure.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| ProviderError::Auth("GEMINI_API_KEY not set".to_string()))?;
        Ok(Self::new(GEMINI_HOST.to_string(), api_key))
    }
}
