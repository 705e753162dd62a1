//! Merging divergent snapshots of one conversation.
//!
//! The checkpoint store may be read and written from more than one
//! process over the lifetime of a thread (resume after a restart, a retry
//! racing a slow writer). The merge accepts only monotonic differences:
//! values appearing where there were none, flags turning on, default role
//! labels being replaced, one transcript extending the other. Two
//! snapshots that disagree about recorded history cannot be reconciled
//! automatically and fail loudly instead.

use thiserror::Error;

use crate::domain::interview::{Interview, Role};

use super::state::ConversationState;

/// A merge that cannot be performed safely.
#[derive(Debug, Clone, Error)]
pub enum MergeError {
    #[error("snapshots describe different interviews: '{left}' vs '{right}'")]
    IncompatibleTemplates { left: String, right: String },

    #[error("field '{field}' has conflicting values: '{left}' vs '{right}'")]
    ConflictingValue {
        field: String,
        left: String,
        right: String,
    },

    #[error("role '{role}' has conflicting labels: '{left}' vs '{right}'")]
    ConflictingRole {
        role: String,
        left: String,
        right: String,
    },

    #[error("transcripts diverge at message {index}")]
    DivergedTranscripts { index: usize },
}

/// Merges two snapshots of the same logical conversation.
pub fn merge_states(
    a: &ConversationState,
    b: &ConversationState,
) -> Result<ConversationState, MergeError> {
    let interview = merge_interviews(a.interview(), b.interview())?;
    let messages = merge_messages(a, b)?;

    let mut merged = ConversationState::new(interview);
    for message in messages {
        merged.push_message(message.clone());
    }
    if a.digested_confidentials() || b.digested_confidentials() {
        merged.mark_digested_confidentials();
    }
    if a.digested_concludes() || b.digested_concludes() {
        merged.mark_digested_concludes();
    }
    if a.is_concluded() || b.is_concluded() {
        merged.mark_concluded();
    }
    Ok(merged)
}

/// Merges two copies of the same interview, field by field.
///
/// A value set on either side survives; a field set to different values on
/// both sides is a conflict. Role labels merge by the default-overwrite
/// rule: a built-in default label yields to a real one.
pub fn merge_interviews(a: &Interview, b: &Interview) -> Result<Interview, MergeError> {
    let a_names: Vec<_> = a.definition().fields().iter().map(|f| f.name()).collect();
    let b_names: Vec<_> = b.definition().fields().iter().map(|f| f.name()).collect();
    if a.definition().type_name() != b.definition().type_name() || a_names != b_names {
        return Err(MergeError::IncompatibleTemplates {
            left: a.definition().type_name().to_string(),
            right: b.definition().type_name().to_string(),
        });
    }

    let interviewer = merge_roles(
        "interviewer",
        a.definition().interviewer(),
        b.definition().interviewer(),
    )?;
    let interviewee = merge_roles(
        "interviewee",
        a.definition().interviewee(),
        b.definition().interviewee(),
    )?;

    let definition = crate::domain::interview::InterviewDefinition::new(
        a.definition().type_name(),
        a.definition().description(),
        interviewer,
        interviewee,
        a.definition().fields().to_vec(),
    );

    let mut merged = Interview::new(definition);
    for field in a.definition().fields() {
        let name = field.name();
        let value = match (a.value(name), b.value(name)) {
            (None, None) => None,
            (Some(value), None) | (None, Some(value)) => Some(value.clone()),
            (Some(left), Some(right)) => {
                if left == right {
                    Some(left.clone())
                } else {
                    return Err(MergeError::ConflictingValue {
                        field: name.to_string(),
                        left: left.natural().to_string(),
                        right: right.natural().to_string(),
                    });
                }
            }
        };
        if let Some(value) = value {
            // set_value cannot fail here: the field came from the definition.
            merged
                .set_value(name, value)
                .expect("merged field must exist in its own definition");
        }
    }
    Ok(merged)
}

fn merge_roles(which: &str, a: &Role, b: &Role) -> Result<Role, MergeError> {
    let title = if a.title() == b.title() || b.has_default_title() {
        a.title()
    } else if a.has_default_title() {
        b.title()
    } else {
        return Err(MergeError::ConflictingRole {
            role: which.to_string(),
            left: a.title().to_string(),
            right: b.title().to_string(),
        });
    };

    // Traits merge by the prefix rule like any other append-only list.
    let traits = if is_prefix(a.traits(), b.traits()) {
        b.traits()
    } else if is_prefix(b.traits(), a.traits()) {
        a.traits()
    } else {
        return Err(MergeError::ConflictingRole {
            role: which.to_string(),
            left: a.traits().join(", "),
            right: b.traits().join(", "),
        });
    };

    let mut role = Role::new(title);
    for description in traits {
        role = role.with_trait(description.clone());
    }
    Ok(role)
}

fn merge_messages<'a>(
    a: &'a ConversationState,
    b: &'a ConversationState,
) -> Result<&'a [super::message::TranscriptMessage], MergeError> {
    let (shorter, longer) = if a.messages().len() <= b.messages().len() {
        (a.messages(), b.messages())
    } else {
        (b.messages(), a.messages())
    };

    for (index, (left, right)) in shorter.iter().zip(longer.iter()).enumerate() {
        if left != right {
            return Err(MergeError::DivergedTranscripts { index });
        }
    }
    Ok(longer)
}

fn is_prefix(prefix: &[String], full: &[String]) -> bool {
    prefix.len() <= full.len() && prefix.iter().zip(full.iter()).all(|(a, b)| a == b)
}
