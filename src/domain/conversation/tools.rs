//! Tool definitions and the update processor.
//!
//! The chat model never executes anything: tools exist purely as typed
//! channels through which it reports extracted field values. The update
//! processor is the single component allowed to write those values into
//! the interview.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::interview::{FieldValue, Interview};

use super::codec;

/// Definition of a tool bound to a chat-model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g. "update_restaurant_order").
    name: String,

    /// Description shown to the chat model.
    description: String,

    /// JSON Schema for the arguments.
    parameters_schema: Value,
}

impl ToolDefinition {
    /// Creates a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema,
        }
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters schema.
    pub fn parameters_schema(&self) -> &Value {
        &self.parameters_schema
    }

    /// Converts to the OpenAI function-calling format.
    pub fn to_openai_format(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_schema
            }
        })
    }
}

/// Legacy cardinality prefixes still emitted by older schema vintages,
/// paired with their canonical replacements.
const LEGACY_CAST_PREFIXES: [(&str, &str); 4] = [
    ("choose_exactly_one_", "as_one_"),
    ("choose_zero_or_one_", "as_maybe_"),
    ("choose_one_or_more_", "as_multi_"),
    ("choose_zero_or_more_", "as_any_"),
];

/// Rewrites a legacy cardinality-prefixed cast key to its canonical form.
pub fn normalize_cast_key(key: &str) -> String {
    for (legacy, canonical) in LEGACY_CAST_PREFIXES {
        if let Some(rest) = key.strip_prefix(legacy) {
            return format!("{}{}", canonical, rest);
        }
    }
    key.to_string()
}

/// Applies one update tool invocation's arguments to the interview.
///
/// Arguments are a mapping of encoded field name to a value object (or
/// null, which is ignored). Each value object carries the mandatory
/// `value` slot plus one entry per cast. The stored value replaces any
/// prior value wholesale.
///
/// # Errors
///
/// Returns the first problem found - an unknown field, a non-object value,
/// or a missing/mistyped `value` slot. Values applied before the failure
/// stay applied; the caller reports the error back to the model as a tool
/// result rather than unwinding.
pub fn apply_update(interview: &mut Interview, arguments: &Value) -> Result<(), DomainError> {
    let entries = arguments.as_object().ok_or_else(|| {
        DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Tool arguments must be an object, got: {}", arguments),
        )
    })?;

    for (encoded_name, payload) in entries {
        if payload.is_null() {
            continue;
        }

        let field_name = codec::decode(encoded_name);
        let value = parse_field_payload(&field_name, payload)?;
        tracing::debug!(field = %field_name, natural = value.natural(), "recording field value");
        interview.set_value(&field_name, value)?;
    }
    Ok(())
}

fn parse_field_payload(field_name: &str, payload: &Value) -> Result<FieldValue, DomainError> {
    let object = payload.as_object().ok_or_else(|| {
        DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Value for field '{}' must be an object, got: {}", field_name, payload),
        )
    })?;

    let natural = object
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Value for field '{}' is missing its string 'value' slot", field_name),
            )
        })?;

    let mut value = FieldValue::new(natural);
    for (key, cast_result) in object {
        if key == "value" {
            continue;
        }
        value = value.with_cast(normalize_cast_key(key), cast_result.clone());
    }
    Ok(value)
}
