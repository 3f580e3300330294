use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderResult;
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// The normalized finish signal: did the model end its turn with text, or
/// does it want tools executed first?
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
}

/// The normalized output of any backend. `stop_reason` is `ToolUse` exactly
/// when `tool_requests` is non-empty; `from_parts` keeps that coupled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub stop_reason: StopReason,
    pub text: String,
    pub tool_requests: Vec<ToolRequest>,
    pub usage: Usage,
}

impl ChatResponse {
    /// Derive the stop reason from whether any tool requests are present.
    pub fn from_parts<S: Into<String>>(
        text: S,
        tool_requests: Vec<ToolRequest>,
        usage: Usage,
    ) -> Self {
        let stop_reason = if tool_requests.is_empty() {
            StopReason::EndTurn
        } else {
            StopReason::ToolUse
        };
        Self {
            stop_reason,
            text: text.into(),
            tool_requests,
            usage,
        }
    }

    pub fn end_turn<S: Into<String>>(text: S) -> Self {
        Self::from_parts(text, Vec::new(), Usage::default())
    }
}

/// Base trait for model backends (Groq, Gemini, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name used in logs and status lines
    fn name(&self) -> &str;

    /// Send the conversation and tool declarations, get back one normalized
    /// response. Adapters build a fresh request per call and keep no mutable
    /// state beyond their authenticated HTTP client.
    async fn chat(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> ProviderResult<ChatResponse>;
}
