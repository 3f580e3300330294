use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{ChatResponse, Provider};
use super::configs::GroqProviderConfig;
use super::utils::{messages_to_openai_spec, response_to_chat, tools_to_openai_spec};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::Message;
use crate::models::tool::Tool;

/// Groq serves Llama models behind an OpenAI-compatible chat completions
/// endpoint. This is the primary backend.
pub struct GroqProvider {
    client: Client,
    config: GroqProviderConfig,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> ProviderResult<Self> {
        Self::new(GroqProviderConfig::from_env()?)
    }

    async fn post(&self, payload: Value) -> ProviderResult<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Auth(format!(
                    "Groq rejected the API key: {}",
                    body
                )))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::RateLimited(format!(
                    "Groq rate limit hit (429): {}",
                    body
                )))
            }
            status if status.as_u16() >= 500 => {
                Err(ProviderError::Transient(format!("server error: {}", status)))
            }
            status => Err(ProviderError::Malformed(format!(
                "request failed: {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> ProviderResult<ChatResponse> {
        let system_message = json!({
            "role": "system",
            "content": system
        });

        let messages_spec = messages_to_openai_spec(messages);
        let tools_spec = if !tools.is_empty() {
            tools_to_openai_spec(tools)?
        } else {
            vec![]
        };

        // System message goes first
        let mut messages_array = vec![system_message];
        messages_array.extend(messages_spec);

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_array
        });

        if !tools_spec.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), json!(tools_spec));
            payload
                .as_object_mut()
                .unwrap()
                .insert("tool_choice".to_string(), json!("auto"));
        }
        if let Some(temp) = self.config.temperature {
            payload
                .as_object_mut()
                .unwrap()
                .insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload
                .as_object_mut()
                .unwrap()
                .insert("max_tokens".to_string(), json!(tokens));
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(ProviderError::Malformed(format!("Groq API error: {}", error)));
        }

        response_to_chat(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::base::StopReason;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server(response_body: Value) -> (MockServer, GroqProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let config = GroqProviderConfig::new(mock_server.uri(), "test_api_key".to_string());
        let provider = GroqProvider::new(config).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_chat_basic() {
        let response_body = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I assist you today?",
                    "tool_calls": null
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        });

        let (_, provider) = setup_mock_server(response_body).await;

        let messages = vec![Message::user().with_text("Hello?")];
        let response = provider
            .chat("You are a helpful assistant.", &messages, &[])
            .await
            .unwrap();

        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.text, "Hello! How can I assist you today?");
        assert_eq!(response.usage.total_tokens, Some(27));
    }

    #[tokio::test]
    async fn test_chat_tool_request() {
        let response_body = json!({
            "id": "chatcmpl-tool",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "search_job_boards",
                            "arguments": "{\"keywords\":\"rust engineer\",\"location\":\"London\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {
                "prompt_tokens": 20,
                "completion_tokens": 15,
                "total_tokens": 35
            }
        });

        let (_, provider) = setup_mock_server(response_body).await;

        let messages = vec![Message::user().with_text("Find rust jobs in London")];
        let tool = Tool::new(
            "search_job_boards",
            "Search job boards for fresh postings",
            json!({
                "type": "object",
                "properties": {
                    "keywords": {"type": "string"},
                    "location": {"type": "string"}
                },
                "required": ["keywords"]
            }),
        );

        let response = provider
            .chat("You are a job search agent.", &messages, &[tool])
            .await
            .unwrap();

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.tool_requests.len(), 1);
        assert_eq!(response.tool_requests[0].call.name, "search_job_boards");
        assert_eq!(
            response.tool_requests[0].call.arguments,
            json!({"keywords": "rust engineer", "location": "London"})
        );
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_rate_limited() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let config = GroqProviderConfig::new(mock_server.uri(), "test_api_key".to_string());
        let provider = GroqProvider::new(config).unwrap();

        let messages = vec![Message::user().with_text("Hello?")];
        let result = provider.chat("system", &messages, &[]).await;

        assert!(matches!(result, Err(ProviderError::RateLimited(_))));
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_auth() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let config = GroqProviderConfig::new(mock_server.uri(), "bad_key".to_string());
        let provider = GroqProvider::new(config).unwrap();

        let messages = vec![Message::user().with_text("Hello?")];
        let result = provider.chat("system", &messages, &[]).await;

        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }
}
