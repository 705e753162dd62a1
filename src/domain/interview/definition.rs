//! Interview definition - the immutable template of a conversation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

use super::field::FieldSpec;

/// Default type label for the interviewer role.
pub const DEFAULT_INTERVIEWER_TITLE: &str = "Agent";

/// Default type label for the interviewee role.
pub const DEFAULT_INTERVIEWEE_TITLE: &str = "User";

/// One side of the conversation: a type label plus an ordered trait list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Type label, e.g. "Waiter" or "Job Applicant".
    title: String,

    /// Personality/behavior traits in declaration order.
    #[serde(default)]
    traits: Vec<String>,
}

impl Role {
    /// Creates a role with the given type label.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            traits: Vec::new(),
        }
    }

    /// The default interviewer role.
    pub fn default_interviewer() -> Self {
        Self::new(DEFAULT_INTERVIEWER_TITLE)
    }

    /// The default interviewee role.
    pub fn default_interviewee() -> Self {
        Self::new(DEFAULT_INTERVIEWEE_TITLE)
    }

    /// Adds a trait.
    pub fn with_trait(mut self, description: impl Into<String>) -> Self {
        self.traits.push(description.into());
        self
    }

    /// Returns the type label.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the traits in declaration order.
    pub fn traits(&self) -> &[String] {
        &self.traits
    }

    /// Returns true if the label is one of the built-in defaults.
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_INTERVIEWER_TITLE || self.title == DEFAULT_INTERVIEWEE_TITLE
    }
}

/// Immutable template describing what a conversation must collect.
///
/// Field declaration order is significant and preserved in every generated
/// prompt and schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewDefinition {
    /// Name of the thing being collected, e.g. "Restaurant Order".
    type_name: String,

    /// One-line description of the conversation's purpose.
    description: String,

    /// The agent conducting the conversation.
    interviewer: Role,

    /// The person the information is collected from.
    interviewee: Role,

    /// Field declarations in source order.
    fields: Vec<FieldSpec>,
}

impl InterviewDefinition {
    /// Creates a definition. Prefer the builder for anything non-trivial.
    pub fn new(
        type_name: impl Into<String>,
        description: impl Into<String>,
        interviewer: Role,
        interviewee: Role,
        fields: Vec<FieldSpec>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            description: description.into(),
            interviewer,
            interviewee,
            fields,
        }
    }

    /// Returns the type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the interviewer role.
    pub fn interviewer(&self) -> &Role {
        &self.interviewer
    }

    /// Returns the interviewee role.
    pub fn interviewee(&self) -> &Role {
        &self.interviewee
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Deterministic identifier derived from the type name.
    ///
    /// Used to name generated tools, so repeated turns of the same
    /// interview reuse equivalent tool identities.
    pub fn identity(&self) -> String {
        let mut id = String::with_capacity(self.type_name.len());
        let mut last_was_separator = true;
        for ch in self.type_name.chars() {
            if ch.is_ascii_alphanumeric() {
                id.push(ch.to_ascii_lowercase());
                last_was_separator = false;
            } else if !last_was_separator {
                id.push('_');
                last_was_separator = true;
            }
        }
        while id.ends_with('_') {
            id.pop();
        }
        if id.is_empty() {
            id.push_str("interview");
        }
        id
    }

    /// Validates the whole template.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            field.validate()?;
            if !seen.insert(field.name()) {
                return Err(ValidationError::duplicate(field.name()));
            }
        }
        Ok(())
    }
}
