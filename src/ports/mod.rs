//! Ports - interfaces to external collaborators.
//!
//! The conversation engine consumes a chat model, a checkpoint store, and
//! a prompt renderer through these traits; adapters provide the concrete
//! implementations.

mod chat_model;
mod checkpoint_store;
mod prompt_renderer;

pub use chat_model::{ChatModel, ChatModelError, ModelTurn};
pub use checkpoint_store::{CheckpointError, CheckpointStore};
pub use prompt_renderer::{
    FieldPromptData, PromptContext, PromptRenderer, RenderError, TemplateId,
};
