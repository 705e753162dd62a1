//! Fluent builder for interview definitions.
//!
//! The builder mirrors how a caller thinks about an interview: name it,
//! describe the two roles, then declare fields one after another, piling
//! rules and casts onto whichever field was declared last.
//!
//! ```ignore
//! let interview = Interview::builder("Restaurant Order")
//!     .description("Dinner order for one guest")
//!     .interviewer(Role::new("Waiter").with_trait("suggests the daily specials"))
//!     .interviewee(Role::new("Guest"))
//!     .field("entree")
//!     .desc("Main course selection")
//!     .must("be an item from the menu")
//!     .as_one("course", ["fish", "steak", "pasta"])
//!     .field("table feedback")
//!     .confidential()
//!     .build()?;
//! ```

use crate::domain::foundation::{DomainError, ValidationError};

use super::cast::{CastSpec, PrimitiveKind};
use super::definition::{InterviewDefinition, Role};
use super::field::FieldSpec;
use super::interview::Interview;

/// Builder for [`Interview`] values.
///
/// All methods are infallible; problems are collected and reported by
/// [`InterviewBuilder::build`], so configuration mistakes surface before
/// any conversation starts.
#[derive(Debug, Clone)]
pub struct InterviewBuilder {
    type_name: String,
    description: String,
    interviewer: Role,
    interviewee: Role,
    fields: Vec<FieldSpec>,
    current: Option<FieldSpec>,
    errors: Vec<ValidationError>,
}

impl InterviewBuilder {
    /// Starts a builder for the given interview type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            description: String::new(),
            interviewer: Role::default_interviewer(),
            interviewee: Role::default_interviewee(),
            fields: Vec::new(),
            current: None,
            errors: Vec::new(),
        }
    }

    /// Sets the interview description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the interviewer role.
    pub fn interviewer(mut self, role: Role) -> Self {
        self.interviewer = role;
        self
    }

    /// Sets the interviewee role.
    pub fn interviewee(mut self, role: Role) -> Self {
        self.interviewee = role;
        self
    }

    /// Starts declaring a new field. Subsequent rule and cast calls apply
    /// to this field until the next `field` call.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.finish_current();
        self.current = Some(FieldSpec::new(name));
        self
    }

    /// Adds a fully built field declaration.
    pub fn field_spec(mut self, spec: FieldSpec) -> Self {
        self.finish_current();
        self.fields.push(spec);
        self
    }

    /// Sets the current field's description.
    pub fn desc(self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.on_current("desc", move |field| field.set_description(description))
    }

    /// Adds a validation requirement to the current field.
    pub fn must(self, rule: impl Into<String>) -> Self {
        let rule = rule.into();
        self.on_current("must", move |field| field.add_must(rule))
    }

    /// Adds a rejection rule to the current field.
    pub fn reject(self, rule: impl Into<String>) -> Self {
        let rule = rule.into();
        self.on_current("reject", move |field| field.add_reject(rule))
    }

    /// Adds helpful context to the current field.
    pub fn hint(self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.on_current("hint", move |field| field.add_hint(hint))
    }

    /// Marks the current field confidential (tracked silently).
    pub fn confidential(self) -> Self {
        self.on_current("confidential", |field| field.set_confidential())
    }

    /// Marks the current field as synthesized at conversation end.
    /// Implies confidential.
    pub fn conclude(self) -> Self {
        self.on_current("conclude", |field| field.set_conclude())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cast sugar
    // ─────────────────────────────────────────────────────────────────────

    /// Adds an integer cast.
    pub fn as_int(self) -> Self {
        self.cast("as_int", CastSpec::new(PrimitiveKind::Int, "Parse as integer"))
    }

    /// Adds a float cast.
    pub fn as_float(self) -> Self {
        self.cast(
            "as_float",
            CastSpec::new(PrimitiveKind::Float, "Parse as floating point number"),
        )
    }

    /// Adds a boolean cast.
    pub fn as_bool(self) -> Self {
        self.cast("as_bool", CastSpec::new(PrimitiveKind::Bool, "Parse as boolean"))
    }

    /// Adds a string-rendering cast.
    pub fn as_text(self) -> Self {
        self.cast("as_text", CastSpec::new(PrimitiveKind::Text, "Format as string"))
    }

    /// Adds a percentage cast (0.0 to 1.0).
    pub fn as_percent(self) -> Self {
        self.cast(
            "as_percent",
            CastSpec::new(PrimitiveKind::Percent, "Parse as percentage (0.0 to 1.0)"),
        )
    }

    /// Adds a list cast.
    pub fn as_list(self) -> Self {
        self.cast("as_list", CastSpec::new(PrimitiveKind::List, "Parse as list/array"))
    }

    /// Adds a unique-set cast.
    pub fn as_set(self) -> Self {
        self.cast("as_set", CastSpec::new(PrimitiveKind::Set, "Parse as unique set"))
    }

    /// Adds a key/value mapping cast.
    pub fn as_map(self) -> Self {
        self.cast(
            "as_map",
            CastSpec::new(PrimitiveKind::Map, "Parse as key-value mapping"),
        )
    }

    /// Adds a translation cast for the given language.
    pub fn as_lang(self, language: impl Into<String>) -> Self {
        let language = language.into();
        let name = format!("as_lang_{}", language);
        let prompt = format!("Translate to {}", language);
        self.cast(name, CastSpec::new(PrimitiveKind::Lang, prompt))
    }

    /// Adds an exactly-one choice cast.
    pub fn as_one(
        self,
        sub_name: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let sub_name = sub_name.into();
        let name = format!("as_one_{}", sub_name);
        let prompt = format!("Choose for {}", sub_name);
        self.cast(name, CastSpec::one(prompt, choices))
    }

    /// Adds a zero-or-one choice cast.
    pub fn as_maybe(
        self,
        sub_name: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let sub_name = sub_name.into();
        let name = format!("as_maybe_{}", sub_name);
        let prompt = format!("Choose for {}", sub_name);
        self.cast(name, CastSpec::maybe(prompt, choices))
    }

    /// Adds a one-or-more choice cast.
    pub fn as_multi(
        self,
        sub_name: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let sub_name = sub_name.into();
        let name = format!("as_multi_{}", sub_name);
        let prompt = format!("Choose for {}", sub_name);
        self.cast(name, CastSpec::multi(prompt, choices))
    }

    /// Adds a zero-or-more choice cast.
    pub fn as_any(
        self,
        sub_name: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let sub_name = sub_name.into();
        let name = format!("as_any_{}", sub_name);
        let prompt = format!("Choose for {}", sub_name);
        self.cast(name, CastSpec::any(prompt, choices))
    }

    /// Adds an arbitrary cast under an explicit name. Escape hatch for
    /// custom prompts, e.g. `cast("as_bool_is_even", CastSpec::new(...))`.
    pub fn cast(self, name: impl Into<String>, spec: CastSpec) -> Self {
        let name = name.into();
        self.on_current("cast", move |field| field.add_cast(name, spec))
    }

    /// Finalizes the builder into a validated [`Interview`].
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found: rules declared
    /// before any field, duplicate field or cast names, choice casts with
    /// no choices, or a conclude field that lost its confidential marker.
    pub fn build(mut self) -> Result<Interview, DomainError> {
        self.finish_current();
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error.into());
        }

        let definition = InterviewDefinition::new(
            self.type_name,
            self.description,
            self.interviewer,
            self.interviewee,
            self.fields,
        );
        definition.validate()?;
        Ok(Interview::new(definition))
    }

    fn finish_current(&mut self) {
        if let Some(field) = self.current.take() {
            self.fields.push(field);
        }
    }

    fn on_current(mut self, method: &str, apply: impl FnOnce(&mut FieldSpec)) -> Self {
        match self.current.as_mut() {
            Some(field) => apply(field),
            None => self.errors.push(ValidationError::invalid_format(
                method,
                "declared before any field",
            )),
        }
        self
    }
}
