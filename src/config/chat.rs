//! Chat model configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::conversation::{
    check_endpoint, EndpointSecurityMode, InterviewerOptions, DEFAULT_MODEL_ID,
};

use super::error::ValidationError;

/// Chat model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    /// Model identifier with provider prefix (e.g. "openai:gpt-4o")
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Base URL of the chat-model endpoint (a backend proxy, usually)
    pub base_url: Option<String>,

    /// API key
    pub api_key: Option<String>,

    /// Endpoint security enforcement
    #[serde(default)]
    pub endpoint_security: EndpointSecurityMode,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl ChatSettings {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.model_id.starts_with("openai:") {
            return Err(ValidationError::invalid(
                "model_id",
                format!("must start with \"openai:\", got '{}'", self.model_id),
            ));
        }

        check_endpoint(self.base_url.as_deref(), self.endpoint_security)
            .map_err(|err| ValidationError::invalid("base_url", err.to_string()))?;

        Ok(())
    }

    /// Converts these settings into interviewer construction options.
    pub fn interviewer_options(&self) -> InterviewerOptions {
        let mut options = InterviewerOptions::default()
            .with_model_id(self.model_id.clone())
            .with_endpoint_security(self.endpoint_security);
        if let Some(temperature) = self.temperature {
            options = options.with_temperature(temperature);
        }
        if let Some(base_url) = &self.base_url {
            options = options.with_base_url(base_url.clone());
        }
        if let Some(api_key) = &self.api_key {
            options = options.with_api_key(api_key.clone());
        }
        options
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            temperature: None,
            base_url: None,
            api_key: None,
            endpoint_security: EndpointSecurityMode::default(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = ChatSettings::default();
        assert_eq!(settings.model_id, "openai:gpt-4o");
        assert_eq!(settings.timeout_secs, 60);
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.endpoint_security, EndpointSecurityMode::Disabled);
    }

    #[test]
    fn timeout_converts_to_duration() {
        let settings = ChatSettings {
            timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn validation_rejects_unprefixed_model_id() {
        let settings = ChatSettings {
            model_id: "gpt-4o".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validation_enforces_strict_endpoint_security() {
        let settings = ChatSettings {
            base_url: Some("https://api.openai.com/v1".to_string()),
            endpoint_security: EndpointSecurityMode::Strict,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validation_accepts_proxy_under_strict_mode() {
        let settings = ChatSettings {
            base_url: Some("https://proxy.example.com/v1".to_string()),
            endpoint_security: EndpointSecurityMode::Strict,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn interviewer_options_carry_settings_over() {
        let settings = ChatSettings {
            model_id: "openai:gpt-4o-mini".to_string(),
            temperature: Some(0.3),
            base_url: Some("https://proxy.example.com/v1".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };

        let options = settings.interviewer_options();
        assert_eq!(options.model_id.as_deref(), Some("openai:gpt-4o-mini"));
        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.base_url.as_deref(), Some("https://proxy.example.com/v1"));
        assert_eq!(options.api_key.as_deref(), Some("key"));
    }
}
