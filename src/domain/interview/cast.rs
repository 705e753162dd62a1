//! Cast declarations - typed secondary transforms of a field's value.
//!
//! A cast asks the chat model to produce an additional, typed rendering of
//! a field alongside its natural string value (an integer parse, a boolean
//! classification, a constrained choice, a translation). The cast prompt
//! is instruction text for the model only; it is never shown to the
//! respondent.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// The primitive shape a cast asks the model to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Whole number.
    Int,
    /// Floating point number.
    Float,
    /// True/false classification.
    Bool,
    /// Free-form string rendering.
    Text,
    /// Fraction in the closed interval [0.0, 1.0].
    Percent,
    /// Ordered list of items.
    List,
    /// Unordered collection of unique items.
    Set,
    /// Key/value mapping.
    Map,
    /// Translation into another language.
    Lang,
    /// Exactly-one (or zero-or-one when nullable) selection from fixed choices.
    SingleChoice,
    /// One-or-more (or zero-or-more when nullable) selections from fixed choices.
    MultiChoice,
}

impl PrimitiveKind {
    /// Returns true for the choice kinds, which carry a choice list.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }
}

/// Declaration of one cast on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastSpec {
    /// The primitive shape requested from the model.
    kind: PrimitiveKind,

    /// Model-only instruction describing the transform.
    prompt: String,

    /// Allowed selections. Only meaningful for choice kinds.
    #[serde(default)]
    choices: Vec<String>,

    /// Whether the selection may be absent (choice kinds only).
    #[serde(default)]
    nullable: bool,
}

impl CastSpec {
    /// Creates a non-choice cast.
    pub fn new(kind: PrimitiveKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            choices: Vec::new(),
            nullable: false,
        }
    }

    /// Creates an exactly-one choice cast.
    pub fn one(prompt: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::choice(PrimitiveKind::SingleChoice, prompt, choices, false)
    }

    /// Creates a zero-or-one choice cast.
    pub fn maybe(prompt: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::choice(PrimitiveKind::SingleChoice, prompt, choices, true)
    }

    /// Creates a one-or-more choice cast.
    pub fn multi(prompt: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::choice(PrimitiveKind::MultiChoice, prompt, choices, false)
    }

    /// Creates a zero-or-more choice cast.
    pub fn any(prompt: impl Into<String>, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::choice(PrimitiveKind::MultiChoice, prompt, choices, true)
    }

    fn choice(
        kind: PrimitiveKind,
        prompt: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
        nullable: bool,
    ) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            nullable,
        }
    }

    /// Returns the primitive kind.
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Returns the model-only prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the choice list.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Returns whether the selection may be absent.
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Minimum number of selections for choice kinds.
    pub fn min_selections(&self) -> usize {
        if self.nullable {
            0
        } else {
            1
        }
    }

    /// Maximum number of selections for choice kinds.
    pub fn max_selections(&self) -> usize {
        match self.kind {
            PrimitiveKind::MultiChoice => self.choices.len(),
            _ => 1,
        }
    }

    /// Validates the declaration.
    ///
    /// # Errors
    ///
    /// - Choice kinds with no choices.
    /// - Non-choice kinds carrying a choice list.
    pub fn validate(&self, cast_name: &str) -> Result<(), ValidationError> {
        if self.kind.is_choice() && self.choices.is_empty() {
            return Err(ValidationError::invalid_format(
                cast_name,
                "choice cast requires at least one choice",
            ));
        }
        if !self.kind.is_choice() && !self.choices.is_empty() {
            return Err(ValidationError::invalid_format(
                cast_name,
                format!("{:?} cast cannot carry a choice list", self.kind),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_plain_cast() {
        let cast = CastSpec::new(PrimitiveKind::Int, "Parse as integer");
        assert_eq!(cast.kind(), PrimitiveKind::Int);
        assert_eq!(cast.prompt(), "Parse as integer");
        assert!(cast.choices().is_empty());
        assert!(!cast.nullable());
    }

    #[test]
    fn one_requires_exactly_one_selection() {
        let cast = CastSpec::one("Choose for color", ["red", "green", "blue"]);
        assert_eq!(cast.kind(), PrimitiveKind::SingleChoice);
        assert_eq!(cast.min_selections(), 1);
        assert_eq!(cast.max_selections(), 1);
    }

    #[test]
    fn maybe_allows_zero_selections() {
        let cast = CastSpec::maybe("Choose for color", ["red", "green"]);
        assert_eq!(cast.min_selections(), 0);
        assert_eq!(cast.max_selections(), 1);
    }

    #[test]
    fn multi_caps_at_choice_count() {
        let cast = CastSpec::multi("Choose for toppings", ["onion", "pepper", "olive"]);
        assert_eq!(cast.min_selections(), 1);
        assert_eq!(cast.max_selections(), 3);
    }

    #[test]
    fn any_allows_empty_selection() {
        let cast = CastSpec::any("Choose for toppings", ["onion", "pepper"]);
        assert_eq!(cast.min_selections(), 0);
        assert_eq!(cast.max_selections(), 2);
    }

    #[test]
    fn validate_rejects_choice_without_choices() {
        let cast = CastSpec::one("Choose", Vec::<String>::new());
        assert!(cast.validate("as_one_color").is_err());
    }

    #[test]
    fn validate_accepts_plain_cast() {
        let cast = CastSpec::new(PrimitiveKind::Bool, "True if even");
        assert!(cast.validate("as_bool_is_even").is_ok());
    }

    #[test]
    fn serializes_kind_as_snake_case() {
        let json = serde_json::to_string(&PrimitiveKind::SingleChoice).unwrap();
        assert_eq!(json, "\"single_choice\"");
    }
}
