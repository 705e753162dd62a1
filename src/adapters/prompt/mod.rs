//! Prompt renderer adapters.

mod static_templates;

pub use static_templates::StaticPromptRenderer;
