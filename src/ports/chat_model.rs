//! Chat Model Port - Interface for LLM chat integrations.
//!
//! The orchestrator needs exactly one capability from a model provider:
//! given the transcript so far and an optional set of bound tools, return
//! the model's next turn - either plain text for the respondent or one or
//! more tool invocations. Implementations translate to a concrete
//! provider API and must support cancellation by future drop.

use async_trait::async_trait;

use crate::domain::conversation::{ToolDefinition, ToolInvocation, TranscriptMessage};

/// Port for chat-model interactions.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generates the model's next turn from the full transcript.
    ///
    /// `tools` may be empty, in which case the model can only answer with
    /// text. When tools are bound the model may answer with invocations
    /// instead of (or in addition to) text.
    async fn invoke(
        &self,
        messages: &[TranscriptMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, ChatModelError>;
}

/// One turn produced by the chat model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTurn {
    /// Text content. May be empty when the turn only carries tool calls.
    pub content: String,

    /// Tool invocations requested by the model.
    pub tool_calls: Vec<ToolInvocation>,
}

impl ModelTurn {
    /// Creates a plain text turn.
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a turn carrying tool invocations.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    /// Returns true if the turn requests any tool invocation.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Chat model errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatModelError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Provider is unavailable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ChatModelError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChatModelError::RateLimited { .. }
                | ChatModelError::Timeout { .. }
                | ChatModelError::Unavailable(_)
                | ChatModelError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_turn_has_no_tool_calls() {
        let turn = ModelTurn::message("Hello there");
        assert!(!turn.has_tool_calls());
        assert_eq!(turn.content, "Hello there");
    }

    #[test]
    fn tool_call_turn_reports_calls() {
        let call = ToolInvocation::new("call_1", "update_order", json!({}));
        let turn = ModelTurn::with_tool_calls("", vec![call]);
        assert!(turn.has_tool_calls());
    }

    #[test]
    fn retryable_classification() {
        assert!(ChatModelError::RateLimited { retry_after_secs: 30 }.is_retryable());
        assert!(ChatModelError::Timeout { timeout_secs: 60 }.is_retryable());
        assert!(ChatModelError::unavailable("down").is_retryable());
        assert!(ChatModelError::network("reset").is_retryable());

        assert!(!ChatModelError::AuthenticationFailed.is_retryable());
        assert!(!ChatModelError::parse("bad json").is_retryable());
        assert!(!ChatModelError::InvalidRequest("bad".into()).is_retryable());
    }

    #[test]
    fn errors_display_useful_messages() {
        assert_eq!(
            ChatModelError::RateLimited { retry_after_secs: 30 }.to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            ChatModelError::Timeout { timeout_secs: 60 }.to_string(),
            "request timed out after 60s"
        );
    }
}
