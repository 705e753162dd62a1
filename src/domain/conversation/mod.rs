//! Conversation domain - the orchestration engine.
//!
//! Everything that turns an interview template into a live, resumable
//! conversation: the field-name codec, tool schema generation, the update
//! processor, digestion, snapshot merging, endpoint security, and the
//! orchestrator itself.

pub mod codec;
mod digest;
mod merge;
mod message;
mod orchestrator;
mod schema;
mod security;
mod state;
mod tools;

pub use digest::{DigestPass, DigestPhase, DigestionController};
pub use merge::{merge_interviews, merge_states, MergeError};
pub use message::{MessageId, Role, ToolInvocation, TranscriptMessage, TOOL_SUCCESS};
pub use orchestrator::{
    EngineNode, Interviewer, InterviewerError, InterviewerOptions, DEFAULT_MODEL_ID,
};
pub use schema::{cast_schema, conclude_resolve_tool, confidential_resolve_tool, field_schema, update_tool};
pub use security::{check_endpoint, EndpointSecurityMode, DANGEROUS_ENDPOINTS};
pub use state::ConversationState;
pub use tools::{apply_update, normalize_cast_key, ToolDefinition};
