use regex::Regex;
use serde_json::{json, Value};

use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::{Message, MessageContent, ToolRequest};
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::{ChatResponse, Usage};

/// Convert internal Message format to the OpenAI-style message specification
/// Groq consumes. Tool responses become separate "tool" role entries keyed by
/// the original request id.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });

        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        converted["content"] = json!(text.text);
                    }
                }
                MessageContent::ToolRequest(request) => {
                    let sanitized_name = sanitize_function_name(&request.call.name);
                    let tool_calls = converted
                        .as_object_mut()
                        .unwrap()
                        .entry("tool_calls")
                        .or_insert(json!([]));

                    tool_calls.as_array_mut().unwrap().push(json!({
                        "id": request.id,
                        "type": "function",
                        "function": {
                            "name": sanitized_name,
                            "arguments": request.call.arguments.to_string(),
                        }
                    }));
                }
                MessageContent::ToolResponse(response) => {
                    output.push(json!({
                        "role": "tool",
                        "content": response.output,
                        "tool_call_id": response.request_id
                    }));
                }
            }
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Convert internal Tool format to the OpenAI-style tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> ProviderResult<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ProviderError::Malformed(format!(
                "duplicate tool name: {}",
                tool.name
            )));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert an OpenAI-style completion response to the normalized ChatResponse.
///
/// A finish reason of "tool_calls" maps to tool use; anything else is an end
/// of turn. Argument blobs that fail to parse are replaced with an empty
/// object so the toolkit still receives the call and can report the problem
/// back to the model as a tool result.
pub fn response_to_chat(response: &Value) -> ProviderResult<ChatResponse> {
    let message = response
        .pointer("/choices/0/message")
        .ok_or_else(|| ProviderError::Malformed("response has no choices".to_string()))?;

    let text = message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    let mut tool_requests = Vec::new();
    if let Some(tool_calls) = message.get("tool_calls").and_then(|t| t.as_array()) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();

            let parsed = match serde_json::from_str::<Value>(arguments) {
                Ok(args) if args.is_object() => args,
                Ok(other) => {
                    tracing::warn!(tool = %function_name, ?other, "tool arguments were not an object, substituting empty input");
                    json!({})
                }
                Err(err) => {
                    tracing::warn!(tool = %function_name, %err, "could not parse tool arguments, substituting empty input");
                    json!({})
                }
            };

            tool_requests.push(ToolRequest {
                id,
                call: ToolCall::new(&function_name, parsed),
            });
        }
    }

    Ok(ChatResponse::from_parts(
        text,
        tool_requests,
        get_openai_usage(response),
    ))
}

/// Token usage from an OpenAI-style response; absent fields stay None.
pub fn get_openai_usage(data: &Value) -> Usage {
    let usage = match data.get("usage") {
        Some(usage) => usage,
        None => return Usage::default(),
    };

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

/// Case-insensitive check for the usual rate-limit and quota markers in an
/// error message.
pub fn is_rate_limit_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["rate", "limit", "429", "quota"]
        .iter()
        .any(|marker| lower.contains(marker))
}
