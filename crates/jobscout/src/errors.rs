use thiserror::Error;

/// Failures surfaced by a single model backend.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transient(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures surfaced by the fallback router. These are the only errors an
/// agent run cannot absorb: without a working backend there is no way to
/// make progress.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("no model provider configured — set GROQ_API_KEY or GEMINI_API_KEY")]
    NoProviderConfigured,

    #[error("{0}")]
    AllProvidersFailed(String),
}
