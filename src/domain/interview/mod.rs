//! Interview domain - templates, fields, casts, and collected values.
//!
//! An [`InterviewDefinition`] declares what a conversation must collect;
//! an [`Interview`] pairs that template with the values collected so far.

mod builder;
mod cast;
mod definition;
mod field;
#[allow(clippy::module_inception)]
mod interview;

pub use builder::InterviewBuilder;
pub use cast::{CastSpec, PrimitiveKind};
pub use definition::{
    InterviewDefinition, Role, DEFAULT_INTERVIEWEE_TITLE, DEFAULT_INTERVIEWER_TITLE,
};
pub use field::{FieldSpec, FieldValue};
pub use interview::Interview;
