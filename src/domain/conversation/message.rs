//! Transcript messages - the ordered log of a conversation.
//!
//! Messages are immutable records. Assistant messages may carry tool
//! invocations; tool-result messages answer exactly one invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;

/// Content of a successful tool-result message.
pub const TOOL_SUCCESS: &str = "Success";

/// Unique identifier for a message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (never shown to the respondent).
    System,
    /// Respondent input.
    User,
    /// Chat model output.
    Assistant,
    /// Result of dispatching one tool invocation.
    Tool,
}

/// One tool call requested by the chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Provider-assigned call identifier, echoed in the result message.
    id: String,

    /// Name of the tool being invoked.
    name: String,

    /// Arguments as a JSON object.
    arguments: Value,
}

impl ToolInvocation {
    /// Creates a tool invocation.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Returns the call identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments.
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }
}

/// An immutable message in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// Unique identifier for this message.
    id: MessageId,

    /// The role of the sender.
    role: Role,

    /// Text content. May be empty on assistant messages that only carry
    /// tool invocations.
    content: String,

    /// Tool invocations requested by an assistant message.
    #[serde(default)]
    tool_calls: Vec<ToolInvocation>,

    /// For tool-result messages, the invocation being answered.
    #[serde(default)]
    tool_call_id: Option<String>,

    /// For tool-result messages, the tool that was dispatched.
    #[serde(default)]
    tool_name: Option<String>,

    /// When the message was created.
    created_at: Timestamp,
}

impl TranscriptMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates an assistant message carrying tool invocations.
    pub fn assistant_with_tools(
        content: impl Into<String>,
        tool_calls: Vec<ToolInvocation>,
    ) -> Self {
        let mut message = Self::new(Role::Assistant, content);
        message.tool_calls = tool_calls;
        message
    }

    /// Creates a successful tool-result message.
    pub fn tool_success(call_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        let mut message = Self::new(Role::Tool, TOOL_SUCCESS);
        message.tool_call_id = Some(call_id.into());
        message.tool_name = Some(tool_name.into());
        message
    }

    /// Creates a tool-result message carrying a captured error.
    pub fn tool_error(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut message = Self::new(Role::Tool, format!("Error: {}", error.into()));
        message.tool_call_id = Some(call_id.into());
        message.tool_name = Some(tool_name.into());
        message
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the message ID.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the tool invocations.
    pub fn tool_calls(&self) -> &[ToolInvocation] {
        &self.tool_calls
    }

    /// Returns the answered invocation id, for tool-result messages.
    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }

    /// Returns the dispatched tool name, for tool-result messages.
    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this is an assistant message with tool calls.
    pub fn has_tool_calls(&self) -> bool {
        self.role == Role::Assistant && !self.tool_calls.is_empty()
    }

    /// Returns true if this is a tool result that succeeded.
    pub fn is_successful_tool_result(&self) -> bool {
        self.role == Role::Tool && self.content == TOOL_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod construction {
        use super::*;

        #[test]
        fn constructors_set_roles() {
            assert_eq!(TranscriptMessage::system("s").role(), Role::System);
            assert_eq!(TranscriptMessage::user("u").role(), Role::User);
            assert_eq!(TranscriptMessage::assistant("a").role(), Role::Assistant);
        }

        #[test]
        fn assistant_with_tools_carries_invocations() {
            let call = ToolInvocation::new("call_1", "update_order", json!({"x": 1}));
            let message = TranscriptMessage::assistant_with_tools("", vec![call]);

            assert!(message.has_tool_calls());
            assert_eq!(message.tool_calls()[0].name(), "update_order");
        }

        #[test]
        fn plain_assistant_has_no_tool_calls() {
            let message = TranscriptMessage::assistant("hello");
            assert!(!message.has_tool_calls());
        }

        #[test]
        fn tool_success_echoes_call_id() {
            let message = TranscriptMessage::tool_success("call_1", "update_order");
            assert_eq!(message.role(), Role::Tool);
            assert_eq!(message.content(), TOOL_SUCCESS);
            assert_eq!(message.tool_call_id(), Some("call_1"));
            assert_eq!(message.tool_name(), Some("update_order"));
            assert!(message.is_successful_tool_result());
        }

        #[test]
        fn tool_error_is_not_successful() {
            let message = TranscriptMessage::tool_error("call_1", "update_order", "bad shape");
            assert!(!message.is_successful_tool_result());
            assert!(message.content().starts_with("Error: "));
            assert!(message.content().contains("bad shape"));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn role_serializes_lowercase() {
            assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
            assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        }

        #[test]
        fn message_round_trips_through_json() {
            let call = ToolInvocation::new("call_1", "update_order", json!({"field": null}));
            let message = TranscriptMessage::assistant_with_tools("working on it", vec![call]);

            let json = serde_json::to_string(&message).unwrap();
            let back: TranscriptMessage = serde_json::from_str(&json).unwrap();
            assert_eq!(message, back);
        }
    }
}
