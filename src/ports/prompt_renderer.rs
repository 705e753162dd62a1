//! Prompt Renderer Port - Interface for prompt-text rendering.
//!
//! The core decides *when* a prompt is needed and supplies a context
//! object; how the text is worded belongs to the renderer. The core
//! treats rendered text as opaque.
//!
//! Confidentiality note: contexts deliberately carry field names,
//! descriptions, and validation rules, but never cast prompts - those
//! exist only inside generated tool schemas.

use thiserror::Error;

use crate::domain::interview::{FieldSpec, Interview};

/// Identifies which prompt a renderer should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// The one-time system prompt that opens a conversation.
    SystemPrompt,
    /// The tool-bound instruction of the confidential digestion pass.
    DigestConfidential,
    /// The tool-bound instruction of the conclude digestion pass.
    DigestConclude,
}

/// Per-field data made available to templates.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPromptData {
    pub name: String,
    pub description: String,
    pub must: Vec<String>,
    pub reject: Vec<String>,
    pub hints: Vec<String>,
    pub confidential: bool,
}

/// Context object supplied to every render call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub interview_name: String,
    pub description: String,
    pub interviewer_title: String,
    pub interviewer_traits: Vec<String>,
    pub interviewee_title: String,
    pub interviewee_traits: Vec<String>,
    /// Fields relevant to the template, in declaration order.
    pub fields: Vec<FieldPromptData>,
}

impl PromptContext {
    /// Context for the opening system prompt: every non-conclude field
    /// with its full rule set.
    pub fn system_prompt(interview: &Interview) -> Self {
        let definition = interview.definition();
        let fields = definition
            .fields()
            .iter()
            .filter(|field| !field.is_conclude())
            .map(Self::full_field_data)
            .collect();
        Self::from_definition(interview, fields)
    }

    /// Context for a digestion pass: the given fields by name and
    /// description only.
    pub fn digest(interview: &Interview, fields: &[&FieldSpec]) -> Self {
        let fields = fields
            .iter()
            .map(|field| FieldPromptData {
                name: field.name().to_string(),
                description: field.description().to_string(),
                must: Vec::new(),
                reject: Vec::new(),
                hints: Vec::new(),
                confidential: field.is_confidential(),
            })
            .collect();
        Self::from_definition(interview, fields)
    }

    fn from_definition(interview: &Interview, fields: Vec<FieldPromptData>) -> Self {
        let definition = interview.definition();
        Self {
            interview_name: definition.type_name().to_string(),
            description: definition.description().to_string(),
            interviewer_title: definition.interviewer().title().to_string(),
            interviewer_traits: definition.interviewer().traits().to_vec(),
            interviewee_title: definition.interviewee().title().to_string(),
            interviewee_traits: definition.interviewee().traits().to_vec(),
            fields,
        }
    }

    fn full_field_data(field: &FieldSpec) -> FieldPromptData {
        FieldPromptData {
            name: field.name().to_string(),
            description: field.description().to_string(),
            must: field.must().to_vec(),
            reject: field.reject().to_vec(),
            hints: field.hints().to_vec(),
            confidential: field.is_confidential(),
        }
    }

    /// Total count of must rules across the context's fields.
    pub fn must_count(&self) -> usize {
        self.fields.iter().map(|field| field.must.len()).sum()
    }

    /// Total count of reject rules across the context's fields.
    pub fn reject_count(&self) -> usize {
        self.fields.iter().map(|field| field.reject.len()).sum()
    }
}

/// Prompt rendering errors.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("template has no rendering rule for {0:?}")]
    UnknownTemplate(TemplateId),
}

/// Port for rendering prompt text from a context object.
pub trait PromptRenderer: Send + Sync {
    /// Renders the identified template with the given context.
    fn render(&self, template: TemplateId, context: &PromptContext) -> Result<String, RenderError>;
}
