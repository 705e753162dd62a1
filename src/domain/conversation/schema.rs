//! Per-turn tool schema generation.
//!
//! Pure data transforms from an interview definition to the JSON Schemas
//! bound on chat-model calls: each field compiles to an object fragment
//! with a mandatory natural-value slot plus one typed slot per declared
//! cast. Cast prompts appear only here, as slot descriptions the model
//! reads; they are never rendered into user-visible text.

use serde_json::{json, Map, Value};

use crate::domain::interview::{CastSpec, FieldSpec, Interview, PrimitiveKind};

use super::codec;
use super::tools::ToolDefinition;

/// Compiles one cast declaration into its schema slot.
pub fn cast_schema(spec: &CastSpec) -> Value {
    let mut schema = match spec.kind() {
        PrimitiveKind::Int => json!({"type": "integer"}),
        PrimitiveKind::Float => json!({"type": "number"}),
        PrimitiveKind::Bool => json!({"type": "boolean"}),
        PrimitiveKind::Text | PrimitiveKind::Lang => json!({"type": "string"}),
        PrimitiveKind::Percent => json!({"type": "number", "minimum": 0.0, "maximum": 1.0}),
        PrimitiveKind::List => json!({"type": "array", "items": {}}),
        PrimitiveKind::Set => json!({"type": "array", "items": {}, "uniqueItems": true}),
        PrimitiveKind::Map => json!({"type": "object"}),
        PrimitiveKind::SingleChoice => {
            let selection = json!({"type": "string", "enum": spec.choices()});
            if spec.nullable() {
                json!({"anyOf": [selection, {"type": "null"}]})
            } else {
                selection
            }
        }
        PrimitiveKind::MultiChoice => json!({
            "type": "array",
            "items": {"type": "string", "enum": spec.choices()},
            "minItems": spec.min_selections(),
            "maxItems": spec.max_selections(),
            "uniqueItems": true,
        }),
    };

    schema["description"] = Value::String(spec.prompt().to_string());
    schema
}

/// Compiles one field declaration into its schema fragment.
///
/// The fragment is an object with the mandatory `value` slot and one slot
/// per declared cast, all listed as required.
pub fn field_schema(interview_name: &str, field: &FieldSpec) -> Value {
    let mut properties = Map::new();
    properties.insert(
        "value".to_string(),
        json!({
            "type": "string",
            "title": "Natural Value",
            "description": format!(
                "The most typical valid representation of a {} {}. \
                 An empty string means the respondent explicitly declined; \
                 omit the whole field if it has not been discussed.",
                interview_name,
                field.name()
            ),
        }),
    );

    let mut required = vec![Value::String("value".to_string())];
    for (cast_name, cast) in field.casts() {
        properties.insert(cast_name.clone(), cast_schema(cast));
        required.push(Value::String(cast_name.clone()));
    }

    json!({
        "type": "object",
        "description": field.description(),
        "properties": Value::Object(properties),
        "required": required,
    })
}

fn arguments_schema(
    interview_name: &str,
    fields: &[&FieldSpec],
    optional_slots: bool,
) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        let encoded = codec::encode(field.name());
        let slot = field_schema(interview_name, field);
        if optional_slots {
            properties.insert(encoded, json!({"anyOf": [slot, {"type": "null"}]}));
        } else {
            required.push(Value::String(encoded.clone()));
            properties.insert(encoded, slot);
        }
    }

    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    })
}

/// Builds the ordinary per-turn update tool: one optional slot per
/// non-conclude field.
pub fn update_tool(interview: &Interview) -> ToolDefinition {
    let definition = interview.definition();
    let fields: Vec<&FieldSpec> = definition
        .fields()
        .iter()
        .filter(|field| !field.is_conclude())
        .collect();

    ToolDefinition::new(
        format!("update_{}", definition.identity()),
        format!(
            "Record valid information shared by the {} about the {}",
            definition.interviewee().title(),
            definition.type_name()
        ),
        arguments_schema(definition.type_name(), &fields, true),
    )
}

/// Builds the digestion tool that forces resolution of still-unset
/// confidential fields. Returns `None` when nothing needs resolving.
pub fn confidential_resolve_tool(interview: &Interview) -> Option<ToolDefinition> {
    let definition = interview.definition();
    let fields = interview.unresolved_confidential_fields();
    if fields.is_empty() {
        return None;
    }

    Some(ToolDefinition::new(
        format!("update_confidential_{}", definition.identity()),
        format!(
            "Record those confidential fields about the {} from the {} \
             which have no relevant information so far.",
            definition.type_name(),
            definition.interviewee().title()
        ),
        arguments_schema(definition.type_name(), &fields, false),
    ))
}

/// Builds the digestion tool that resolves every conclude field.
/// Returns `None` when the interview declares none.
pub fn conclude_resolve_tool(interview: &Interview) -> Option<ToolDefinition> {
    let definition = interview.definition();
    let fields = interview.conclude_fields();
    if fields.is_empty() {
        return None;
    }

    Some(ToolDefinition::new(
        format!("conclude_{}", definition.identity()),
        format!(
            "Record key required information about the {} by summarizing, \
             synthesizing, or recalling the conversation so far with the {}",
            definition.type_name(),
            definition.interviewee().title()
        ),
        arguments_schema(definition.type_name(), &fields, false),
    ))
}
