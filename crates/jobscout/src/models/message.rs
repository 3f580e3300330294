use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

/// A request from the model to invoke one of the declared tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// A unique identifier for this request within its turn
    pub id: String,
    pub call: ToolCall,
}

/// The textual outcome of executing a tool, tied back to its request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// The identifier of the original tool request
    pub request_id: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
/// Content passed inside a message, which can be plain text or tool content
pub enum MessageContent {
    Text(TextContent),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn tool_request<S: Into<String>>(id: S, call: ToolCall) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            call,
        })
    }

    pub fn tool_response<S: Into<String>, T: Into<String>>(request_id: S, output: T) -> Self {
        MessageContent::ToolResponse(ToolResponse {
            request_id: request_id.into(),
            output: output.into(),
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        if let MessageContent::ToolRequest(ref tool_request) = self {
            Some(tool_request)
        } else {
            None
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        if let MessageContent::ToolResponse(ref tool_response) = self {
            Some(tool_response)
        } else {
            None
        }
    }
}

/// A message to or from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Message {
            role: Role::User,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add a tool request to the message. Only assistant messages carry
    /// tool requests.
    pub fn with_tool_request<S: Into<String>>(self, id: S, call: ToolCall) -> Self {
        debug_assert!(matches!(self.role, Role::Assistant));
        self.with_content(MessageContent::tool_request(id, call))
    }

    /// Add a tool response to the message. Only user messages carry tool
    /// responses, and each must answer a request from the preceding
    /// assistant message.
    pub fn with_tool_response<S: Into<String>, T: Into<String>>(
        self,
        request_id: S,
        output: T,
    ) -> Self {
        debug_assert!(matches!(self.role, Role::User));
        self.with_content(MessageContent::tool_response(request_id, output))
    }

    /// Concatenated text of every Text block
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| content.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.content
            .iter()
            .filter_map(|content| content.as_tool_request())
            .collect()
    }

    pub fn tool_responses(&self) -> Vec<&ToolResponse> {
        self.content
            .iter()
            .filter_map(|content| content.as_tool_response())
            .collect()
    }

    pub fn has_tool_request(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, MessageContent::ToolRequest(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_user_message() {
        let message = Message::user().with_text("abcd");
        assert!(matches!(message.role, Role::User));
        assert_eq!(message.text(), "abcd");
    }

    #[test]
    fn test_message_tool_requests() {
        let message = Message::assistant()
            .with_tool_request("1", ToolCall::new("save_job", json!({})))
            .with_tool_request("2", ToolCall::new("save_job", json!({})));

        let requests = message.tool_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].call.name, "save_job");
        assert!(message.has_tool_request());
    }

    #[test]
    fn test_message_tool_responses() {
        let message = Message::user()
            .with_tool_response("1", "first result")
            .with_tool_response("2", "second result");

        let responses = message.tool_responses();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].request_id, "1");
        assert_eq!(responses[1].output, "second result");
    }

    #[test]
    fn test_serialization() {
        let message = Message::assistant()
            .with_text("Searching now")
            .with_tool_request("req_1", ToolCall::new("search_job_boards", json!({"keywords": "rust"})));

        let serialized = serde_json::to_string(&message).unwrap();
        let deserialized: Message = serde_json::from_str(&serialized).unwrap();

        assert_eq!(message, deserialized);

        let json_value: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(json_value["role"], "assistant");
        assert!(json_value.get("created").is_some());
        assert_eq!(json_value["content"][1]["type"], "ToolRequest");
    }
}
