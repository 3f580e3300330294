use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{ChatResponse, Provider};

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    name: String,
    responses: Mutex<Vec<ChatResponse>>,
    attempts: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self::named("mock", responses)
    }

    pub fn named<S: Into<String>>(name: S, responses: Vec<ChatResponse>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(responses),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of chat calls, usable after the provider is boxed
    pub fn attempts_handle(&self) -> Arc<AtomicUsize> {
        self.attempts.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> ProviderResult<ChatResponse> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return an empty turn if no more pre-configured responses
            Ok(ChatResponse::end_turn(""))
        } else {
            Ok(responses.remove(0))
        }
    }
}

/// A mock provider that replays the same response forever, for exercising
/// turn ceilings.
pub struct RepeatingProvider {
    response: ChatResponse,
}

impl RepeatingProvider {
    pub fn new(response: ChatResponse) -> Self {
        Self { response }
    }
}

#[async_trait]
impl Provider for RepeatingProvider {
    fn name(&self) -> &str {
        "repeating"
    }

    async fn chat(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> ProviderResult<ChatResponse> {
        Ok(self.response.clone())
    }
}

/// A mock provider that always fails with a fixed error, counting attempts.
pub struct FailingProvider {
    name: String,
    error: fn(String) -> ProviderError,
    message: String,
    attempts: Arc<AtomicUsize>,
}

impl FailingProvider {
    pub fn new<S: Into<String>>(
        name: S,
        error: fn(String) -> ProviderError,
        message: &str,
    ) -> Self {
        Self {
            name: name.into(),
            error,
            message: message.to_string(),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of chat calls, usable after the provider is boxed
    pub fn attempts_handle(&self) -> Arc<AtomicUsize> {
        self.attempts.clone()
    }
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> ProviderResult<ChatResponse> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err((self.error)(self.message.clone()))
    }
}
