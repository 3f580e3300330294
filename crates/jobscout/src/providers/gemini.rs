use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use super::base::{ChatResponse, Provider, Usage};
use super::configs::GeminiProviderConfig;
use super::utils::is_rate_limit_error;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::{Message, MessageContent, Role, ToolRequest};
use crate::models::tool::{Tool, ToolCall};

/// Google Gemini over the generateContent REST API. This is the fallback
/// backend; it performs one adapter-local retry after a cool-down when the
/// API reports a rate limit, before giving up and letting the router decide.
pub struct GeminiProvider {
    client: Client,
    config: GeminiProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> ProviderResult<Self> {
        Self::new(GeminiProviderConfig::from_env()?)
    }

    fn messages_to_contents(messages: &[Message]) -> Vec<Value> {
        let mut contents = Vec::new();

        for message in messages {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "model",
            };

            let mut parts = Vec::new();
            for content in &message.content {
                match content {
                    MessageContent::Text(text) => {
                        if !text.text.is_empty() {
                            parts.push(json!({"text": text.text}));
                        }
                    }
                    MessageContent::ToolRequest(request) => {
                        parts.push(json!({
                            "functionCall": {
                                "name": request.call.name,
                                "args": request.call.arguments,
                            }
                        }));
                    }
                    MessageContent::ToolResponse(response) => {
                        parts.push(json!({
                            "functionResponse": {
                                "name": response.request_id,
                                "response": {"result": response.output},
                            }
                        }));
                    }
                }
            }

            if !parts.is_empty() {
                contents.push(json!({"role": role, "parts": parts}));
            }
        }

        contents
    }

    fn tools_to_declarations(tools: &[Tool]) -> Value {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                })
            })
            .collect();

        json!([{"functionDeclarations": declarations}])
    }

    fn parse_response(response: &Value) -> ProviderResult<ChatResponse> {
        let parts = response
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
            .ok_or_else(|| {
                ProviderError::Malformed("Gemini response has no candidate parts".to_string())
            })?;

        let mut text_parts = Vec::new();
        let mut tool_requests = Vec::new();

        for part in parts {
            if let Some(call) = part.get("functionCall") {
                let name = call
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or_default()
                    .to_string();
                let args = call.get("args").cloned().unwrap_or_else(|| json!({}));
                tool_requests.push(ToolRequest {
                    id: format!("gemini_{}", Uuid::new_v4().simple()),
                    call: ToolCall::new(name, args),
                });
            } else if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                text_parts.push(text.to_string());
            }
        }

        Ok(ChatResponse::from_parts(
            text_parts.join("\n"),
            tool_requests,
            Self::get_usage(response),
        ))
    }

    fn get_usage(data: &Value) -> Usage {
        let meta = match data.get("usageMetadata") {
            Some(meta) => meta,
            None => return Usage::default(),
        };
        let read = |key: &str| meta.get(key).and_then(|v| v.as_i64()).map(|v| v as i32);
        Usage::new(
            read("promptTokenCount"),
            read("candidatesTokenCount"),
            read("totalTokenCount"),
        )
    }

    async fn post(&self, payload: &Value) -> ProviderResult<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.host.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        );

        let response = self.client.post(&url).json(payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Auth(format!(
                    "Gemini rejected the API key: {}",
                    body
                )))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::RateLimited(format!(
                    "Gemini rate limit hit (429): {}",
                    body
                )))
            }
            status if status.as_u16() >= 500 => {
                Err(ProviderError::Transient(format!("server error: {}", status)))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                if is_rate_limit_error(&body) {
                    Err(ProviderError::RateLimited(body))
                } else {
                    Err(ProviderError::Malformed(format!(
                        "request failed: {} - {}",
                        status, body
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> ProviderResult<ChatResponse> {
        let mut payload = json!({
            "contents": Self::messages_to_contents(messages),
        });

        if !system.is_empty() {
            payload.as_object_mut().unwrap().insert(
                "system_instruction".to_string(),
                json!({"parts": [{"text": system}]}),
            );
        }
        if !tools.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), Self::tools_to_declarations(tools));
        }

        // Retry once on a rate limit, after the configured cool-down. This
        // is adapter-local; a second failure goes back to the router.
        let response = match self.post(&payload).await {
            Ok(response) => response,
            Err(ProviderError::RateLimited(reason)) => {
                tracing::warn!(
                    %reason,
                    cooldown_secs = self.config.retry_cooldown.as_secs(),
                    "Gemini rate limit — waiting before one retry"
                );
                tokio::time::sleep(self.config.retry_cooldown).await;
                self.post(&payload).await?
            }
            Err(err) => return Err(err),
        };

        Self::parse_response(&response)
    }
}
