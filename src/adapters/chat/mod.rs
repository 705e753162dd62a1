//! Chat model adapters.

mod openai;
mod scripted;

pub use openai::{OpenAiChatConfig, OpenAiChatModel};
pub use scripted::{RecordedInvocation, ScriptedChatModel};
