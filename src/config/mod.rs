//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `COLLOQUY` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use colloquy::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod chat;
mod error;

pub use chat::ChatSettings;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Chat model configuration
    #[serde(default)]
    pub chat: ChatSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `COLLOQUY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `COLLOQUY__CHAT__MODEL_ID=openai:gpt-4o` -> `chat.model_id`
    /// - `COLLOQUY__CHAT__BASE_URL=...` -> `chat.base_url`
    /// - `COLLOQUY__CHAT__ENDPOINT_SECURITY=strict` -> `chat.endpoint_security`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into their types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COLLOQUY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.chat.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("COLLOQUY__CHAT__MODEL_ID");
        env::remove_var("COLLOQUY__CHAT__BASE_URL");
        env::remove_var("COLLOQUY__CHAT__API_KEY");
        env::remove_var("COLLOQUY__CHAT__ENDPOINT_SECURITY");
        env::remove_var("COLLOQUY__CHAT__TIMEOUT_SECS");
    }

    #[test]
    fn loads_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.chat.model_id, "openai:gpt-4o");
        assert!(config.chat.base_url.is_none());
    }

    #[test]
    fn loads_values_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("COLLOQUY__CHAT__MODEL_ID", "openai:gpt-4o-mini");
        env::set_var("COLLOQUY__CHAT__BASE_URL", "https://proxy.example.com/v1");
        env::set_var("COLLOQUY__CHAT__ENDPOINT_SECURITY", "warn");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.chat.model_id, "openai:gpt-4o-mini");
        assert_eq!(config.chat.base_url.as_deref(), Some("https://proxy.example.com/v1"));
    }

    #[test]
    fn custom_timeout_is_parsed() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("COLLOQUY__CHAT__TIMEOUT_SECS", "120");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().chat.timeout_secs, 120);
    }

    #[test]
    fn validate_accepts_defaults() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }
}
