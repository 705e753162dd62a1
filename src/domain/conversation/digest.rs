//! Digestion - forced resolution of confidential and conclude fields.
//!
//! Confidential fields are never asked about, and conclude fields are
//! synthesized from the whole conversation, so neither fills in during
//! ordinary turns. Once every ordinary field is collected the engine
//! runs two one-shot passes that bind a resolve tool and instruct the
//! model to settle what remains.

use crate::domain::foundation::StateMachine;
use crate::domain::interview::Interview;
use crate::ports::{PromptContext, PromptRenderer, RenderError, TemplateId};

use super::schema;
use super::state::ConversationState;
use super::tools::ToolDefinition;

/// Progress of digestion over the life of one conversation.
///
/// The two `digested_*` flags on [`ConversationState`] are the persisted
/// form; this enum is the view the engine routes on. Both flags are
/// monotonic, so each resolving phase runs at most once no matter how
/// often `enough` is re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestPhase {
    /// Ordinary collection is still in progress.
    Idle,
    /// Forcing still-unset confidential fields to a resolution.
    ResolvingConfidentials,
    /// Forcing conclude fields to a resolution.
    ResolvingConcludes,
    /// Both passes have run.
    Done,
}

impl DigestPhase {
    /// Derives the current phase from a conversation snapshot.
    pub fn of(state: &ConversationState) -> Self {
        if !state.interview().enough() {
            return DigestPhase::Idle;
        }
        if !state.digested_confidentials() {
            return DigestPhase::ResolvingConfidentials;
        }
        if !state.digested_concludes() {
            return DigestPhase::ResolvingConcludes;
        }
        DigestPhase::Done
    }
}

impl StateMachine for DigestPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DigestPhase::*;
        matches!(
            (self, target),
            (Idle, ResolvingConfidentials)
                | (ResolvingConfidentials, ResolvingConcludes)
                | (ResolvingConcludes, Done)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DigestPhase::*;
        match self {
            Idle => vec![ResolvingConfidentials],
            ResolvingConfidentials => vec![ResolvingConcludes],
            ResolvingConcludes => vec![Done],
            Done => vec![],
        }
    }
}

/// One tool-bound instruction ready to send to the chat model.
#[derive(Debug, Clone)]
pub struct DigestPass {
    /// The resolve tool to bind on the call.
    pub tool: ToolDefinition,

    /// The rendered system instruction. Lists the affected fields by name
    /// and description only - cast prompts stay inside the tool schema.
    pub instruction: String,
}

/// Builds the tool-bound instructions for the two digestion passes.
pub struct DigestionController<'a> {
    renderer: &'a dyn PromptRenderer,
}

impl<'a> DigestionController<'a> {
    /// Creates a controller over the given renderer.
    pub fn new(renderer: &'a dyn PromptRenderer) -> Self {
        Self { renderer }
    }

    /// Prepares the confidential pass. Returns `None` when every
    /// confidential field already has a value, in which case the caller
    /// just marks the pass done.
    pub fn confidential_pass(
        &self,
        interview: &Interview,
    ) -> Result<Option<DigestPass>, RenderError> {
        let Some(tool) = schema::confidential_resolve_tool(interview) else {
            return Ok(None);
        };

        let fields = interview.unresolved_confidential_fields();
        let context = PromptContext::digest(interview, &fields);
        let instruction = self.renderer.render(TemplateId::DigestConfidential, &context)?;
        Ok(Some(DigestPass { tool, instruction }))
    }

    /// Prepares the conclude pass. Returns `None` when the interview
    /// declares no conclude fields.
    pub fn conclude_pass(&self, interview: &Interview) -> Result<Option<DigestPass>, RenderError> {
        let Some(tool) = schema::conclude_resolve_tool(interview) else {
            return Ok(None);
        };

        let fields = interview.conclude_fields();
        let context = PromptContext::digest(interview, &fields);
        let instruction = self.renderer.render(TemplateId::DigestConclude, &context)?;
        Ok(Some(DigestPass { tool, instruction }))
    }
}
