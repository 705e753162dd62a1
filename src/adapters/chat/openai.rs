//! OpenAI Chat Adapter - ChatModel implementation over the OpenAI
//! chat-completions API.
//!
//! Works against any OpenAI-compatible endpoint (the official API or a
//! backend proxy) with function/tool calling. Non-streaming: the
//! orchestrator consumes whole turns.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiChatConfig::new(api_key)
//!     .with_model("gpt-4o")
//!     .with_base_url("https://llm-proxy.example.com/v1");
//!
//! let model = OpenAiChatModel::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::{Role, ToolDefinition, ToolInvocation, TranscriptMessage};
use crate::ports::{ChatModel, ChatModelError, ModelTurn};

/// Configuration for the OpenAI chat adapter.
#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g. "gpt-4o").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Sampling temperature, omitted from requests when `None`.
    pub temperature: Option<f32>,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAiChatConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: Some(0.0),
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Drops the temperature from requests (for models that reject it).
    pub fn without_temperature(mut self) -> Self {
        self.temperature = None;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat-completions adapter.
pub struct OpenAiChatModel {
    config: OpenAiChatConfig,
    client: Client,
}

impl OpenAiChatModel {
    /// Creates a new adapter with the given configuration.
    pub fn new(config: OpenAiChatConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts transcript and tools to the wire request.
    fn to_wire_request(
        &self,
        messages: &[TranscriptMessage],
        tools: &[ToolDefinition],
    ) -> WireRequest {
        let messages = messages.iter().map(to_wire_message).collect();
        let tools = if tools.is_empty() {
            None
        } else {
            Some(tools.iter().map(ToolDefinition::to_openai_format).collect())
        };

        WireRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            tools,
        }
    }

    async fn send_request(&self, request: &WireRequest) -> Result<Response, ChatModelError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatModelError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ChatModelError::network(format!("Connection failed: {}", e))
                } else {
                    ChatModelError::network(e.to_string())
                }
            })
    }

    /// Maps the response status to an error, passing successes through.
    async fn handle_response_status(&self, response: Response) -> Result<Response, ChatModelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(ChatModelError::AuthenticationFailed),
            429 => Err(ChatModelError::RateLimited {
                retry_after_secs: parse_retry_after(&error_body),
            }),
            400 => Err(ChatModelError::InvalidRequest(error_body)),
            500..=599 => Err(ChatModelError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(ChatModelError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    async fn parse_response(&self, response: Response) -> Result<ModelTurn, ChatModelError> {
        let response = self.handle_response_status(response).await?;

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| ChatModelError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = wire
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatModelError::parse("No choices in response"))?;

        let content = choice.message.content.unwrap_or_default();
        let mut tool_calls = Vec::new();
        for call in choice.message.tool_calls.unwrap_or_default() {
            let arguments = serde_json::from_str(&call.function.arguments).map_err(|e| {
                ChatModelError::parse(format!(
                    "Tool call '{}' has unparseable arguments: {}",
                    call.function.name, e
                ))
            })?;
            tool_calls.push(ToolInvocation::new(call.id, call.function.name, arguments));
        }

        Ok(ModelTurn {
            content,
            tool_calls,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn invoke(
        &self,
        messages: &[TranscriptMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, ChatModelError> {
        let request = self.to_wire_request(messages, tools);

        let mut last_error = ChatModelError::network("No attempts made");
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            match self.send_request(&request).await {
                Ok(response) => match self.parse_response(response).await {
                    Ok(turn) => return Ok(turn),
                    Err(err) => {
                        if !err.is_retryable() || retry_count >= self.config.max_retries {
                            return Err(err);
                        }
                        last_error = err;
                    }
                },
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    last_error = err;
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            let delay = Duration::from_secs(1 << retry_count);
            sleep(delay).await;
            retry_count += 1;
        }

        Err(last_error)
    }
}

fn to_wire_message(message: &TranscriptMessage) -> WireMessage {
    let role = match message.role() {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let tool_calls = if message.has_tool_calls() {
        Some(
            message
                .tool_calls()
                .iter()
                .map(|call| WireToolCall {
                    id: call.id().to_string(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name().to_string(),
                        arguments: call.arguments().to_string(),
                    },
                })
                .collect(),
        )
    } else {
        None
    };

    WireMessage {
        role: role.to_string(),
        content: Some(message.content().to_string()),
        tool_calls,
        tool_call_id: message.tool_call_id().map(str::to_string),
    }
}

/// Parses a retry hint out of a rate-limit error body.
fn parse_retry_after(error_body: &str) -> u32 {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
        if let Some(message) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = message.find("try again in ") {
                let rest = &message[idx + 13..];
                if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                    if let Ok(secs) = rest[..num_end].parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
    }
    30 // Default retry after
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments, as the API transports them.
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> OpenAiChatModel {
        OpenAiChatModel::new(OpenAiChatConfig::new("test-key"))
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAiChatConfig::new("test-key")
            .with_model("gpt-4o-mini")
            .with_base_url("https://proxy.example.com/v1")
            .with_temperature(0.5)
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5);

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://proxy.example.com/v1");
        assert_eq!(config.temperature, Some(0.5));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn without_temperature_omits_it() {
        let config = OpenAiChatConfig::new("k").without_temperature();
        assert_eq!(config.temperature, None);
    }

    #[test]
    fn completions_url_handles_trailing_slash() {
        let adapter = OpenAiChatModel::new(
            OpenAiChatConfig::new("k").with_base_url("https://proxy.example.com/v1/"),
        );
        assert_eq!(
            adapter.completions_url(),
            "https://proxy.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn wire_request_includes_tools_when_bound() {
        let tool = ToolDefinition::new("update_order", "Record info", json!({"type": "object"}));
        let messages = [TranscriptMessage::user("hello")];
        let request = model().to_wire_request(&messages, std::slice::from_ref(&tool));

        let tools = request.tools.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["function"]["name"], "update_order");
    }

    #[test]
    fn wire_request_omits_empty_tools() {
        let messages = [TranscriptMessage::user("hello")];
        let request = model().to_wire_request(&messages, &[]);
        assert!(request.tools.is_none());
    }

    #[test]
    fn assistant_tool_calls_serialize_with_string_arguments() {
        let call = ToolInvocation::new("call_1", "update_order", json!({"entree": {"value": "pasta"}}));
        let message = TranscriptMessage::assistant_with_tools("", vec![call]);

        let wire = to_wire_message(&message);
        let calls = wire.tool_calls.unwrap();
        assert_eq!(calls[0].kind, "function");
        assert_eq!(calls[0].function.name, "update_order");

        let parsed: serde_json::Value = serde_json::from_str(&calls[0].function.arguments).unwrap();
        assert_eq!(parsed["entree"]["value"], "pasta");
    }

    #[test]
    fn tool_result_messages_carry_their_call_id() {
        let message = TranscriptMessage::tool_success("call_1", "update_order");
        let wire = to_wire_message(&message);

        assert_eq!(wire.role, "tool");
        assert_eq!(wire.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Rate limit exceeded. Please try again in 30 seconds."}}"#;
        assert_eq!(parse_retry_after(error), 30);
    }

    #[test]
    fn parse_retry_after_default() {
        let error = r#"{"error":{"message":"Something went wrong"}}"#;
        assert_eq!(parse_retry_after(error), 30);
    }
}
