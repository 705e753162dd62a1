//! Configuration error types

use thiserror::Error;

/// Errors loading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors validating configuration values
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Creates an invalid-value error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_displays_variable_name() {
        let err = ValidationError::MissingRequired("COLLOQUY__CHAT__API_KEY");
        assert!(err.to_string().contains("COLLOQUY__CHAT__API_KEY"));
    }

    #[test]
    fn invalid_displays_field_and_reason() {
        let err = ValidationError::invalid("model_id", "missing provider prefix");
        assert!(err.to_string().contains("model_id"));
        assert!(err.to_string().contains("missing provider prefix"));
    }
}
