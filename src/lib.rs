//! Colloquy - conversational data collection driven by LLM tool calling.
//!
//! A caller declares an interview - named fields with descriptions,
//! validation rules, confidentiality markers, and typed casts - and an
//! [`Interviewer`] drives a multi-turn conversation with an end user
//! (relayed through a chat model) until every field is collected,
//! validated, and transformed. Internal validation logic, derived fields,
//! and tool schemas are never exposed to the end user.
//!
//! ```ignore
//! use colloquy::{Interview, Interviewer, InterviewerOptions};
//!
//! let interview = Interview::builder("Restaurant Order")
//!     .field("entree")
//!     .must("be an item from the menu")
//!     .field("table feedback")
//!     .confidential()
//!     .build()?;
//!
//! let interviewer = Interviewer::new(interview, InterviewerOptions::default())?;
//! let mut reply = interviewer.go(None).await?;
//! loop {
//!     let user_input = show_and_read(&reply);
//!     reply = interviewer.go(Some(&user_input)).await?;
//!     if interviewer.interview().await.done() {
//!         interviewer.end().await?;
//!         break;
//!     }
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::conversation::{
    ConversationState, EndpointSecurityMode, Interviewer, InterviewerError, InterviewerOptions,
};
pub use domain::foundation::ThreadId;
pub use domain::interview::{
    CastSpec, FieldSpec, FieldValue, Interview, InterviewBuilder, InterviewDefinition,
    PrimitiveKind, Role,
};
