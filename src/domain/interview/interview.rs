//! Interview aggregate - a definition plus the values collected so far.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

use super::builder::InterviewBuilder;
use super::definition::InterviewDefinition;
use super::field::{FieldSpec, FieldValue};

/// A conversation's record: the immutable template and the mutable store
/// of collected field values.
///
/// Values only ever transition from unset to set during normal operation,
/// so the completeness predicates are monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    /// The immutable template.
    definition: InterviewDefinition,

    /// Collected values, keyed by field name. Iteration order comes from
    /// the definition, never from this map.
    values: BTreeMap<String, FieldValue>,
}

impl Interview {
    /// Creates an interview with no values collected.
    pub fn new(definition: InterviewDefinition) -> Self {
        Self {
            definition,
            values: BTreeMap::new(),
        }
    }

    /// Starts a fluent builder.
    pub fn builder(type_name: impl Into<String>) -> InterviewBuilder {
        InterviewBuilder::new(type_name)
    }

    /// Returns the template.
    pub fn definition(&self) -> &InterviewDefinition {
        &self.definition
    }

    /// Returns the collected value of a field, if any.
    pub fn value(&self, field_name: &str) -> Option<&FieldValue> {
        self.values.get(field_name)
    }

    /// Returns true if the named field has a collected value.
    pub fn is_set(&self, field_name: &str) -> bool {
        self.values.contains_key(field_name)
    }

    /// Iterates fields with their values in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&FieldSpec, Option<&FieldValue>)> {
        self.definition
            .fields()
            .iter()
            .map(move |field| (field, self.values.get(field.name())))
    }

    /// Writes a field value, replacing any prior value wholesale.
    ///
    /// Restricted to the crate: the update processor is the only component
    /// that records values during a conversation.
    ///
    /// # Errors
    ///
    /// - `FieldNotFound` if the field is not declared.
    pub(crate) fn set_value(
        &mut self,
        field_name: &str,
        value: FieldValue,
    ) -> Result<(), DomainError> {
        if self.definition.field(field_name).is_none() {
            return Err(DomainError::new(
                ErrorCode::FieldNotFound,
                format!("Interview has no field named '{}'", field_name),
            ));
        }
        if let Some(previous) = self.values.get(field_name) {
            tracing::debug!(
                field = field_name,
                previous = previous.natural(),
                "overwriting previously collected value"
            );
        }
        self.values.insert(field_name.to_string(), value);
        Ok(())
    }

    /// True when every field that is neither confidential nor conclude has
    /// a collected value. Vacuously true when no such fields exist.
    pub fn enough(&self) -> bool {
        self.definition
            .fields()
            .iter()
            .filter(|field| !field.is_confidential() && !field.is_conclude())
            .all(|field| self.is_set(field.name()))
    }

    /// True when `enough` holds and every remaining field (confidential
    /// and conclude included) has a collected value. Vacuously true for an
    /// empty definition.
    pub fn done(&self) -> bool {
        self.enough()
            && self
                .definition
                .fields()
                .iter()
                .all(|field| self.is_set(field.name()))
    }

    /// Names of confidential, non-conclude fields still unset.
    pub fn unresolved_confidential_fields(&self) -> Vec<&FieldSpec> {
        self.definition
            .fields()
            .iter()
            .filter(|field| {
                field.is_confidential() && !field.is_conclude() && !self.is_set(field.name())
            })
            .collect()
    }

    /// All conclude fields, in declaration order.
    pub fn conclude_fields(&self) -> Vec<&FieldSpec> {
        self.definition
            .fields()
            .iter()
            .filter(|field| field.is_conclude())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_field_interview() -> Interview {
        Interview::builder("Survey")
            .field_spec(FieldSpec::new("name"))
            .field_spec({
                let mut f = FieldSpec::new("mood");
                f.set_confidential();
                f
            })
            .field_spec({
                let mut f = FieldSpec::new("verdict");
                f.set_conclude();
                f
            })
            .build()
            .unwrap()
    }

    mod completeness {
        use super::*;

        #[test]
        fn empty_interview_is_enough_and_done() {
            let interview = Interview::builder("Empty").build().unwrap();
            assert!(interview.enough());
            assert!(interview.done());
        }

        #[test]
        fn starts_neither_enough_nor_done() {
            let interview = three_field_interview();
            assert!(!interview.enough());
            assert!(!interview.done());
        }

        #[test]
        fn enough_ignores_confidential_and_conclude_fields() {
            let mut interview = three_field_interview();
            interview.set_value("name", FieldValue::new("Alice")).unwrap();
            assert!(interview.enough());
            assert!(!interview.done());
        }

        #[test]
        fn done_requires_every_field() {
            let mut interview = three_field_interview();
            interview.set_value("name", FieldValue::new("Alice")).unwrap();
            interview.set_value("mood", FieldValue::new("N/A")).unwrap();
            assert!(!interview.done());

            interview.set_value("verdict", FieldValue::new("pass")).unwrap();
            assert!(interview.done());
        }

        #[test]
        fn only_confidential_fields_means_enough_immediately() {
            let interview = Interview::builder("Silent")
                .field_spec({
                    let mut f = FieldSpec::new("secret");
                    f.set_confidential();
                    f
                })
                .build()
                .unwrap();
            assert!(interview.enough());
            assert!(!interview.done());
        }

        #[test]
        fn completeness_never_regresses_as_values_arrive() {
            let mut interview = three_field_interview();
            let mut was_enough = false;
            let mut was_done = false;
            for (name, value) in [("name", "Alice"), ("mood", "fine"), ("verdict", "pass")] {
                interview.set_value(name, FieldValue::new(value)).unwrap();
                assert!(interview.enough() || !was_enough);
                assert!(interview.done() || !was_done);
                was_enough = interview.enough();
                was_done = interview.done();
            }
            assert!(was_done);
        }
    }

    mod values {
        use super::*;

        #[test]
        fn set_value_rejects_unknown_field() {
            let mut interview = three_field_interview();
            let result = interview.set_value("unknown", FieldValue::new("x"));
            assert!(result.is_err());
        }

        #[test]
        fn set_value_overwrites_wholesale() {
            let mut interview = three_field_interview();
            interview
                .set_value(
                    "name",
                    FieldValue::new("Alice").with_cast("as_lang_fr", serde_json::json!("Alice")),
                )
                .unwrap();
            interview.set_value("name", FieldValue::new("Bob")).unwrap();

            let value = interview.value("name").unwrap();
            assert_eq!(value.natural(), "Bob");
            assert!(value.casts().is_empty());
        }

        #[test]
        fn entries_follow_declaration_order() {
            let interview = three_field_interview();
            let names: Vec<_> = interview.entries().map(|(field, _)| field.name()).collect();
            assert_eq!(names, vec!["name", "mood", "verdict"]);
        }
    }

    mod digestion_queries {
        use super::*;

        #[test]
        fn unresolved_confidential_excludes_conclude_and_set() {
            let mut interview = three_field_interview();
            let names: Vec<_> = interview
                .unresolved_confidential_fields()
                .iter()
                .map(|f| f.name().to_string())
                .collect();
            assert_eq!(names, vec!["mood"]);

            interview.set_value("mood", FieldValue::new("fine")).unwrap();
            assert!(interview.unresolved_confidential_fields().is_empty());
        }

        #[test]
        fn conclude_fields_lists_only_conclude() {
            let interview = three_field_interview();
            let names: Vec<_> = interview
                .conclude_fields()
                .iter()
                .map(|f| f.name().to_string())
                .collect();
            assert_eq!(names, vec!["verdict"]);
        }
    }
}
