//! Field declarations and collected field values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::ValidationError;

use super::cast::CastSpec;

/// Declaration of one datum the conversation must collect.
///
/// # Invariants
///
/// - `conclude` implies `confidential` (a conclude field is never asked
///   about directly, so it must also be tracked silently).
/// - Cast names are unique within a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as declared by the caller. Any Unicode string.
    name: String,

    /// Human-readable description, shown in prompts.
    description: String,

    /// Validation requirements the value must satisfy.
    #[serde(default)]
    must: Vec<String>,

    /// Rules whose violation rejects a candidate value.
    #[serde(default)]
    reject: Vec<String>,

    /// Helpful context the model may surface when asked.
    #[serde(default)]
    hints: Vec<String>,

    /// Never asked about proactively; recorded only if volunteered or
    /// resolved during digestion.
    #[serde(default)]
    confidential: bool,

    /// Synthesized from the whole conversation at the end. Implies
    /// confidential.
    #[serde(default)]
    conclude: bool,

    /// Declared casts in declaration order.
    #[serde(default)]
    casts: Vec<(String, CastSpec)>,
}

impl FieldSpec {
    /// Creates a field whose description defaults to its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            must: Vec::new(),
            reject: Vec::new(),
            hints: Vec::new(),
            confidential: false,
            conclude: false,
            casts: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the must rules.
    pub fn must(&self) -> &[String] {
        &self.must
    }

    /// Returns the reject rules.
    pub fn reject(&self) -> &[String] {
        &self.reject
    }

    /// Returns the hints.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Returns true if the field is confidential.
    pub fn is_confidential(&self) -> bool {
        self.confidential
    }

    /// Returns true if the field is a conclude field.
    pub fn is_conclude(&self) -> bool {
        self.conclude
    }

    /// Returns the declared casts in declaration order.
    pub fn casts(&self) -> &[(String, CastSpec)] {
        &self.casts
    }

    /// Looks up a cast by name.
    pub fn cast(&self, name: &str) -> Option<&CastSpec> {
        self.casts
            .iter()
            .find(|(cast_name, _)| cast_name == name)
            .map(|(_, spec)| spec)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutators (used by the builder)
    // ─────────────────────────────────────────────────────────────────────

    pub(crate) fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub(crate) fn add_must(&mut self, rule: impl Into<String>) {
        self.must.push(rule.into());
    }

    pub(crate) fn add_reject(&mut self, rule: impl Into<String>) {
        self.reject.push(rule.into());
    }

    pub(crate) fn add_hint(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    pub(crate) fn set_confidential(&mut self) {
        self.confidential = true;
    }

    pub(crate) fn set_conclude(&mut self) {
        self.conclude = true;
        self.confidential = true;
    }

    pub(crate) fn add_cast(&mut self, name: impl Into<String>, spec: CastSpec) {
        self.casts.push((name.into(), spec));
    }

    /// Validates the declaration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::empty_field("field name"));
        }
        if self.conclude && !self.confidential {
            return Err(ValidationError::invalid_format(
                &self.name,
                "conclude fields must also be confidential",
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for (cast_name, spec) in &self.casts {
            if !seen.insert(cast_name.as_str()) {
                return Err(ValidationError::duplicate(format!(
                    "{}.{}",
                    self.name, cast_name
                )));
            }
            spec.validate(cast_name)?;
        }
        Ok(())
    }
}

/// The collected value of one field.
///
/// A field holds no `FieldValue` until the model records one; from then on
/// it is always fully populated - the natural value plus one entry per
/// declared cast. Updates replace the whole value, never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Canonical human-readable value. Empty string means the respondent
    /// explicitly declined to answer.
    natural: String,

    /// Cast results keyed by cast name.
    #[serde(default)]
    casts: BTreeMap<String, Value>,
}

impl FieldValue {
    /// Creates a value with no cast results.
    pub fn new(natural: impl Into<String>) -> Self {
        Self {
            natural: natural.into(),
            casts: BTreeMap::new(),
        }
    }

    /// Adds a cast result.
    pub fn with_cast(mut self, name: impl Into<String>, value: Value) -> Self {
        self.casts.insert(name.into(), value);
        self
    }

    /// Returns the natural value.
    pub fn natural(&self) -> &str {
        &self.natural
    }

    /// Returns true if the respondent explicitly declined.
    pub fn is_declined(&self) -> bool {
        self.natural.is_empty()
    }

    /// Returns all cast results.
    pub fn casts(&self) -> &BTreeMap<String, Value> {
        &self.casts
    }

    /// Looks up a raw cast result by name.
    pub fn cast(&self, name: &str) -> Option<&Value> {
        self.casts.get(name)
    }

    /// Looks up a cast result as an integer.
    pub fn cast_as_int(&self, name: &str) -> Option<i64> {
        self.cast(name).and_then(Value::as_i64)
    }

    /// Looks up a cast result as a float.
    pub fn cast_as_float(&self, name: &str) -> Option<f64> {
        self.cast(name).and_then(Value::as_f64)
    }

    /// Looks up a cast result as a boolean.
    pub fn cast_as_bool(&self, name: &str) -> Option<bool> {
        self.cast(name).and_then(Value::as_bool)
    }

    /// Looks up a cast result as a string.
    pub fn cast_as_str(&self, name: &str) -> Option<&str> {
        self.cast(name).and_then(Value::as_str)
    }
}
