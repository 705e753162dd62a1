//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Opaque identifier for one persisted conversation thread.
///
/// Callers may supply their own identifier to resume an earlier
/// conversation; a fresh random one is generated otherwise. Any non-empty
/// string is accepted, so external systems can reuse their native keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Creates a new random ThreadId.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a ThreadId from a caller-supplied string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if the string is empty.
    pub fn parse(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("thread_id"));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_values() {
        let id1 = ThreadId::new();
        let id2 = ThreadId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn parse_accepts_arbitrary_strings() {
        let id = ThreadId::parse("order/2024-11-05#7").unwrap();
        assert_eq!(id.as_str(), "order/2024-11-05#7");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(ThreadId::parse("").is_err());
        assert!(ThreadId::parse("   ").is_err());
    }

    #[test]
    fn serializes_transparently() {
        let id = ThreadId::parse("thread-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"thread-1\"");
    }
}
