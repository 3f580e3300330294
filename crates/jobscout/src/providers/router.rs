use crate::errors::{ProviderError, RouterError};
use crate::models::message::Message;
use crate::models::tool::Tool;

use super::base::{ChatResponse, Provider};
use super::gemini::GeminiProvider;
use super::groq::GroqProvider;
use super::utils::is_rate_limit_error;

/// Tries backends in priority order and fails over on any error. A backend
/// that fails is not retried within the same call — adapter-local retry
/// policy (the Gemini cool-down) is the adapters' business, movement between
/// backends is the router's.
pub struct FallbackRouter {
    providers: Vec<Box<dyn Provider>>,
}

impl FallbackRouter {
    /// Build a router over an ordered provider list, primary first.
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Result<Self, RouterError> {
        if providers.is_empty() {
            return Err(RouterError::NoProviderConfigured);
        }
        Ok(Self { providers })
    }

    /// Build from whatever credentials are present in the environment.
    /// A missing credential just omits that backend from the list; it is
    /// only an error when nothing remains.
    pub fn from_env() -> Result<Self, RouterError> {
        let mut providers: Vec<Box<dyn Provider>> = Vec::new();

        match GroqProvider::from_env() {
            Ok(provider) => {
                tracing::info!("Groq client ready (primary)");
                providers.push(Box::new(provider));
            }
            Err(err) => tracing::warn!(%err, "Groq unavailable"),
        }

        match GeminiProvider::from_env() {
            Ok(provider) => {
                tracing::info!("Gemini client ready (fallback)");
                providers.push(Box::new(provider));
            }
            Err(err) => tracing::warn!(%err, "Gemini unavailable"),
        }

        Self::new(providers)
    }

    /// One-line summary of the configured backends, in priority order.
    pub fn status(&self) -> String {
        self.providers
            .iter()
            .enumerate()
            .map(|(i, provider)| {
                let tier = if i == 0 { "primary" } else { "fallback" };
                format!("{} ({})", provider.name(), tier)
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<ChatResponse, RouterError> {
        let mut last_failure: Option<(String, ProviderError)> = None;

        for provider in &self.providers {
            match provider.chat(system, messages, tools).await {
                Ok(response) => {
                    tracing::debug!(provider = provider.name(), "chat completed");
                    return Ok(response);
                }
                Err(err) => {
                    // Classification is diagnostic only; either way the next
                    // backend gets its shot.
                    if is_rate_limit_error(&err.to_string()) {
                        tracing::warn!(
                            provider = provider.name(),
                            %err,
                            "rate limit or quota hit — failing over"
                        );
                    } else {
                        tracing::warn!(provider = provider.name(), %err, "provider failed — failing over");
                    }
                    last_failure = Some((provider.name().to_string(), err));
                }
            }
        }

        let (failed_name, err) = last_failure.expect("router holds at least one provider");
        let primary = self.providers[0].name();
        let message = if self.providers.len() > 1 && is_rate_limit_error(&err.to_string()) {
            // The fallback ran out of quota too. Experience says the primary
            // going down is what pushed all traffic here, so point the
            // operator at it first — a hint, not a verdict.
            format!(
                "{primary} failed and {failed_name} hit its quota as well. \
                 The {primary} failure is the likely root cause — check its API key. \
                 Last error: {err}"
            )
        } else {
            format!("all model providers failed. Last error from {failed_name}: {err}")
        };

        Err(RouterError::AllProvidersFailed(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::{FailingProvider, MockProvider};

    #[test]
    fn test_empty_list_is_rejected() {
        let result = FallbackRouter::new(Vec::new());
        assert!(matches!(result, Err(RouterError::NoProviderConfigured)));
    }

    #[test]
    fn test_status_lists_providers_in_order() {
        let router = FallbackRouter::new(vec![
            Box::new(MockProvider::named("groq", vec![])),
            Box::new(MockProvider::named("gemini", vec![])),
        ])
        .unwrap();

        assert_eq!(router.status(), "groq (primary) | gemini (fallback)");
    }

    #[tokio::test]
    async fn test_failover_to_second_provider() {
        let failing = FailingProvider::new("groq", ProviderError::Auth, "bad key");
        let failing_attempts = failing.attempts_handle();

        let succeeding =
            MockProvider::named("gemini", vec![ChatResponse::end_turn("from fallback")]);
        let succeeding_attempts = succeeding.attempts_handle();

        let router =
            FallbackRouter::new(vec![Box::new(failing), Box::new(succeeding)]).unwrap();

        let response = router.chat("system", &[], &[]).await.unwrap();

        assert_eq!(response.text, "from fallback");
        assert_eq!(failing_attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(
            succeeding_attempts.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = MockProvider::named("groq", vec![ChatResponse::end_turn("from primary")]);
        let fallback = MockProvider::named("gemini", vec![]);
        let fallback_attempts = fallback.attempts_handle();

        let router = FallbackRouter::new(vec![Box::new(primary), Box::new(fallback)]).unwrap();

        let response = router.chat("system", &[], &[]).await.unwrap();

        assert_eq!(response.text, "from primary");
        assert_eq!(fallback_attempts.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhaustion_attempts_each_once() {
        let first = FailingProvider::new("groq", ProviderError::Transient, "connection reset");
        let first_attempts = first.attempts_handle();
        let second = FailingProvider::new("gemini", ProviderError::Transient, "server error: 500");
        let second_attempts = second.attempts_handle();

        let router = FallbackRouter::new(vec![Box::new(first), Box::new(second)]).unwrap();

        let result = router.chat("system", &[], &[]).await;

        let err = match result {
            Err(RouterError::AllProvidersFailed(message)) => message,
            other => panic!("expected AllProvidersFailed, got {:?}", other.map(|r| r.text)),
        };
        assert!(err.contains("gemini"));
        assert!(err.contains("server error: 500"));
        assert_eq!(first_attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(second_attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_quota_blames_primary() {
        let first = FailingProvider::new("groq", ProviderError::Auth, "invalid api key");
        let second =
            FailingProvider::new("gemini", ProviderError::RateLimited, "quota exceeded for today");

        let router = FallbackRouter::new(vec![Box::new(first), Box::new(second)]).unwrap();

        let result = router.chat("system", &[], &[]).await;

        let err = match result {
            Err(RouterError::AllProvidersFailed(message)) => message,
            _ => panic!("expected AllProvidersFailed"),
        };
        assert!(err.contains("groq failure is the likely root cause"));
    }
}
