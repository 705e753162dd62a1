//! Conversation orchestrator - the top-level state machine.
//!
//! One [`Interviewer`] drives one conversation thread. Each `go` call runs
//! the internal state machine through as many nodes as it takes to reach
//! the next suspension point (`listen`) or the end of the conversation
//! (`teardown`), persisting a checkpoint at every point where control
//! returns to the caller.
//!
//! ```text
//! initialize ─▶ think ─▶ listen (suspend; resume appends user input)
//!                 │ ▲        │
//!                 │ └────────┘
//!                 ├─▶ tools ─▶ digest_confidentials ─▶ digest_concludes
//!                 │     ▲            │    │                │    │
//!                 │     └────────────┘    ▼                │    ▼
//!                 │     ◀─────────────── think ◀───────────┘  tools
//!                 └─▶ teardown (done, or explicit end)
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::adapters::chat::{OpenAiChatConfig, OpenAiChatModel};
use crate::adapters::checkpoint::InMemoryCheckpointStore;
use crate::adapters::prompt::StaticPromptRenderer;
use crate::domain::foundation::{DomainError, StateMachine, ThreadId, ValidationError};
use crate::domain::interview::Interview;
use crate::ports::{
    ChatModel, ChatModelError, CheckpointError, CheckpointStore, PromptContext, PromptRenderer,
    RenderError, TemplateId,
};

use super::digest::DigestionController;
use super::message::{Role, TranscriptMessage};
use super::schema;
use super::security::{check_endpoint, EndpointSecurityMode};
use super::state::ConversationState;
use super::tools;

/// Model identifier used when the caller does not pick one.
pub const DEFAULT_MODEL_ID: &str = "openai:gpt-4o";

/// Required provider prefix on model identifiers.
const MODEL_ID_PREFIX: &str = "openai:";

/// Models that reject an explicit sampling temperature.
const FIXED_TEMPERATURE_MODELS: [&str; 2] = ["openai:o3", "openai:o3-mini"];

/// Nodes of the orchestrator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineNode {
    /// Bind the interview template into a fresh conversation state.
    Initialize,
    /// Invoke the chat model and route on its reply.
    Think,
    /// Suspend, yielding the assistant's text to the caller.
    Listen,
    /// Dispatch pending tool invocations to the update processor.
    Tools,
    /// Force resolution of still-unset confidential fields.
    DigestConfidentials,
    /// Force resolution of conclude fields.
    DigestConcludes,
    /// Copy final state to the caller's handle and stop.
    Teardown,
}

impl StateMachine for EngineNode {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EngineNode::*;
        matches!(
            (self, target),
            (Initialize, Think)
                | (Think, Listen)
                | (Think, Tools)
                | (Think, Teardown)
                | (Listen, Think)
                | (Tools, Think)
                | (Tools, DigestConfidentials)
                | (Tools, DigestConcludes)
                | (DigestConfidentials, Tools)
                | (DigestConfidentials, Think)
                | (DigestConfidentials, DigestConcludes)
                | (DigestConcludes, Tools)
                | (DigestConcludes, Think)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EngineNode::*;
        match self {
            Initialize => vec![Think],
            Think => vec![Listen, Tools, Teardown],
            Listen => vec![Think],
            Tools => vec![Think, DigestConfidentials, DigestConcludes],
            DigestConfidentials => vec![Tools, Think, DigestConcludes],
            DigestConcludes => vec![Tools, Think],
            Teardown => vec![],
        }
    }
}

/// Errors surfaced to the caller of an [`Interviewer`].
///
/// Model-side mistakes (an invalid field value, a rule violation) never
/// appear here - those are captured into tool-result messages and handled
/// conversationally. These variants are genuine programming or
/// configuration faults.
#[derive(Debug, Error)]
pub enum InterviewerError {
    /// Invalid construction-time configuration.
    #[error("configuration error: {0}")]
    Config(DomainError),

    /// The chat model call failed.
    #[error("chat model error: {0}")]
    ChatModel(#[from] ChatModelError),

    /// The checkpoint store failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// The prompt renderer failed.
    #[error("prompt rendering error: {0}")]
    Render(#[from] RenderError),

    /// An internal invariant broke: an invalid node transition, a second
    /// system prompt, or a message of the wrong shape where another was
    /// required.
    #[error("state machine violation: {0}")]
    StateMachine(String),

    /// `go` was called with input on the very first turn.
    #[error("user input is not accepted on the first turn")]
    UnexpectedUserInput,

    /// `go` was called without input on a resumed conversation.
    #[error("user input is required to resume a conversation")]
    MissingUserInput,
}

impl From<ValidationError> for InterviewerError {
    fn from(err: ValidationError) -> Self {
        InterviewerError::StateMachine(err.to_string())
    }
}

/// Construction options for an [`Interviewer`].
///
/// Every knob is optional: by default a fresh thread id is generated, the
/// chat model is an OpenAI-compatible client for [`DEFAULT_MODEL_ID`],
/// checkpoints live in memory, and prompts come from the built-in
/// templates.
#[derive(Default)]
pub struct InterviewerOptions {
    pub thread_id: Option<ThreadId>,
    pub chat_model: Option<Arc<dyn ChatModel>>,
    pub checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    pub prompt_renderer: Option<Arc<dyn PromptRenderer>>,
    pub model_id: Option<String>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub endpoint_security: EndpointSecurityMode,
}

impl InterviewerOptions {
    /// Sets the thread identifier.
    pub fn with_thread_id(mut self, thread_id: ThreadId) -> Self {
        self.thread_id = Some(thread_id);
        self
    }

    /// Supplies a chat model, bypassing client construction (and with it
    /// the endpoint check - the caller owns that model's configuration).
    pub fn with_chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Supplies a checkpoint store.
    pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint_store = Some(store);
        self
    }

    /// Supplies a prompt renderer.
    pub fn with_prompt_renderer(mut self, renderer: Arc<dyn PromptRenderer>) -> Self {
        self.prompt_renderer = Some(renderer);
        self
    }

    /// Sets the model identifier (must carry the `openai:` prefix).
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the chat-model base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the endpoint security mode.
    pub fn with_endpoint_security(mut self, mode: EndpointSecurityMode) -> Self {
        self.endpoint_security = mode;
        self
    }
}

/// Drives one conversation that fills one interview.
pub struct Interviewer {
    /// Pristine template used to initialize fresh conversation states.
    template: Interview,

    /// Caller-visible handle, refreshed at every suspension point.
    handle: Arc<RwLock<Interview>>,

    chat_model: Arc<dyn ChatModel>,
    checkpoints: Arc<dyn CheckpointStore>,
    renderer: Arc<dyn PromptRenderer>,
    thread_id: ThreadId,
}

/// What one node execution decided.
enum StepOutcome {
    Continue(EngineNode),
    Suspend(String),
}

impl Interviewer {
    /// Creates an interviewer over the given interview.
    ///
    /// # Errors
    ///
    /// - `Config` when strict endpoint security rejects the configured
    ///   base URL, or the model identifier lacks the `openai:` prefix.
    pub fn new(interview: Interview, options: InterviewerOptions) -> Result<Self, InterviewerError> {
        let thread_id = options.thread_id.unwrap_or_default();

        let chat_model = match options.chat_model {
            Some(model) => model,
            None => {
                check_endpoint(options.base_url.as_deref(), options.endpoint_security)
                    .map_err(InterviewerError::Config)?;

                let model_id = options.model_id.unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
                let temperature = resolve_temperature(&model_id, options.temperature);
                let model_name = strip_model_prefix(&model_id)?;

                let mut config = OpenAiChatConfig::new(options.api_key.unwrap_or_default())
                    .with_model(model_name);
                if let Some(base_url) = options.base_url {
                    config = config.with_base_url(base_url);
                }
                if let Some(temperature) = temperature {
                    config = config.with_temperature(temperature);
                }
                Arc::new(OpenAiChatModel::new(config)) as Arc<dyn ChatModel>
            }
        };

        let checkpoints = options
            .checkpoint_store
            .unwrap_or_else(|| Arc::new(InMemoryCheckpointStore::new()));
        let renderer = options
            .prompt_renderer
            .unwrap_or_else(|| Arc::new(StaticPromptRenderer::new()));

        let handle = Arc::new(RwLock::new(interview.clone()));
        Ok(Self {
            template: interview,
            handle,
            chat_model,
            checkpoints,
            renderer,
            thread_id,
        })
    }

    /// Returns the thread identifier this interviewer drives.
    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    /// Snapshot of the caller-visible interview. Always safe to read: it
    /// is the copy target of `listen`/`teardown`, never the in-flight
    /// working copy.
    pub async fn interview(&self) -> Interview {
        self.handle.read().await.clone()
    }

    /// Advances the conversation one externally visible round and returns
    /// the assistant's next message.
    ///
    /// The very first call must pass `None`; every resumed call must pass
    /// the user's reply. A concluded conversation returns its final text
    /// without performing further turns.
    ///
    /// # Errors
    ///
    /// See [`InterviewerError`]; model-side mistakes do not error.
    pub async fn go(&self, user_input: Option<&str>) -> Result<String, InterviewerError> {
        let stored = self.checkpoints.get(&self.thread_id).await?;

        let (mut state, entry) = match stored {
            Some(state) if state.is_concluded() => {
                tracing::debug!(thread = %self.thread_id, "go on concluded conversation");
                return Ok(state.last_assistant_text().unwrap_or_default().to_string());
            }
            Some(state) if !state.messages().is_empty() => {
                let input = user_input.ok_or(InterviewerError::MissingUserInput)?;
                tracing::info!(thread = %self.thread_id, "continue conversation");
                let mut state = state;
                state.push_message(TranscriptMessage::user(input));
                (state, EngineNode::Listen)
            }
            _ => {
                if user_input.is_some() {
                    return Err(InterviewerError::UnexpectedUserInput);
                }
                tracing::info!(thread = %self.thread_id, "new conversation");
                (self.initialize(), EngineNode::Initialize)
            }
        };

        self.run(&mut state, entry).await
    }

    /// Explicitly ends the conversation, jumping straight to teardown
    /// regardless of current state.
    pub async fn end(&self) -> Result<(), InterviewerError> {
        tracing::debug!(thread = %self.thread_id, "end: jump to teardown");
        let mut state = match self.checkpoints.get(&self.thread_id).await? {
            Some(state) => state,
            None => self.initialize(),
        };
        self.teardown(&mut state).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // State machine driver
    // ─────────────────────────────────────────────────────────────────────

    async fn run(
        &self,
        state: &mut ConversationState,
        entry: EngineNode,
    ) -> Result<String, InterviewerError> {
        // Both entry points (fresh initialize, resumed listen) feed think.
        let mut node = entry.transition_to(EngineNode::Think)?;

        loop {
            tracing::debug!(thread = %self.thread_id, node = ?node, "step");
            let outcome = match node {
                EngineNode::Think => self.think(state).await?,
                EngineNode::Tools => self.tools(state)?,
                EngineNode::DigestConfidentials => self.digest_confidentials(state).await?,
                EngineNode::DigestConcludes => self.digest_concludes(state).await?,
                EngineNode::Listen => StepOutcome::Suspend(self.listen(state).await?),
                EngineNode::Teardown => StepOutcome::Suspend(self.teardown(state).await?),
                EngineNode::Initialize => {
                    return Err(InterviewerError::StateMachine(
                        "initialize cannot re-run inside a round".to_string(),
                    ))
                }
            };

            match outcome {
                StepOutcome::Continue(next) => node = node.transition_to(next)?,
                StepOutcome::Suspend(text) => return Ok(text),
            }
        }
    }

    /// Node: bind the template into a fresh conversation state.
    fn initialize(&self) -> ConversationState {
        tracing::debug!(interview = self.template.definition().type_name(), "initialize");
        ConversationState::new(self.template.clone())
    }

    /// Node: invoke the chat model and route on its reply.
    async fn think(&self, state: &mut ConversationState) -> Result<StepOutcome, InterviewerError> {
        if state.interview().done() {
            return Ok(StepOutcome::Continue(EngineNode::Teardown));
        }

        // Tool selection looks at the conversation as it stood before any
        // system prompt is synthesized this turn.
        let bind_update_tool = match state.last_message() {
            Some(message) if message.role() == Role::System => false,
            Some(message) if message.is_successful_tool_result() => false,
            _ => true,
        };

        if state.system_message_count() == 0 {
            let context = PromptContext::system_prompt(state.interview());
            let prompt = self.renderer.render(TemplateId::SystemPrompt, &context)?;
            self.synthesize_system_prompt(state, prompt)?;
        }

        let tools = if bind_update_tool {
            vec![schema::update_tool(state.interview())]
        } else {
            Vec::new()
        };

        let turn = self.chat_model.invoke(state.messages(), &tools).await?;
        let message = if turn.has_tool_calls() {
            TranscriptMessage::assistant_with_tools(turn.content, turn.tool_calls)
        } else {
            TranscriptMessage::assistant(turn.content)
        };
        let next = if message.has_tool_calls() {
            EngineNode::Tools
        } else {
            EngineNode::Listen
        };
        state.push_message(message);
        Ok(StepOutcome::Continue(next))
    }

    /// Inserts the one-and-only system prompt at the front of the log.
    fn synthesize_system_prompt(
        &self,
        state: &mut ConversationState,
        prompt: String,
    ) -> Result<(), InterviewerError> {
        if state.system_message_count() > 0 {
            return Err(InterviewerError::StateMachine(
                "attempted to synthesize a second system prompt".to_string(),
            ));
        }
        tracing::info!(thread = %self.thread_id, "start conversation");
        state.prepend_system_message(TranscriptMessage::system(prompt));
        Ok(())
    }

    /// Node: dispatch every pending tool invocation.
    fn tools(&self, state: &mut ConversationState) -> Result<StepOutcome, InterviewerError> {
        let last = state.last_message().cloned().ok_or_else(|| {
            InterviewerError::StateMachine("tools node reached with an empty transcript".to_string())
        })?;
        if !last.has_tool_calls() {
            return Err(InterviewerError::StateMachine(
                "tools node requires an assistant message with tool calls".to_string(),
            ));
        }

        for call in last.tool_calls() {
            tracing::debug!(tool = call.name(), id = call.id(), "dispatch tool call");
            match tools::apply_update(state.interview_mut(), call.arguments()) {
                Ok(()) => state.push_message(TranscriptMessage::tool_success(call.id(), call.name())),
                Err(error) => {
                    tracing::warn!(tool = call.name(), %error, "tool call failed");
                    state.push_message(TranscriptMessage::tool_error(
                        call.id(),
                        call.name(),
                        error.to_string(),
                    ));
                }
            }
        }

        // Digestion fires the first time `enough` holds; the monotonic
        // flags keep each pass from running twice.
        let next = if state.interview().enough() {
            if !state.digested_confidentials() {
                EngineNode::DigestConfidentials
            } else if !state.digested_concludes() {
                EngineNode::DigestConcludes
            } else {
                EngineNode::Think
            }
        } else {
            EngineNode::Think
        };
        Ok(StepOutcome::Continue(next))
    }

    /// Node: force resolution of still-unset confidential fields.
    async fn digest_confidentials(
        &self,
        state: &mut ConversationState,
    ) -> Result<StepOutcome, InterviewerError> {
        tracing::debug!(thread = %self.thread_id, "digest confidentials");
        let controller = DigestionController::new(self.renderer.as_ref());
        let pass = controller.confidential_pass(state.interview())?;
        state.mark_digested_confidentials();

        // Nothing to resolve: move straight on to the conclude pass.
        if pass.is_none() && !state.digested_concludes() {
            return Ok(StepOutcome::Continue(EngineNode::DigestConcludes));
        }
        self.run_digest_pass(state, pass).await
    }

    /// Node: force resolution of conclude fields.
    async fn digest_concludes(
        &self,
        state: &mut ConversationState,
    ) -> Result<StepOutcome, InterviewerError> {
        tracing::debug!(thread = %self.thread_id, "digest concludes");
        let controller = DigestionController::new(self.renderer.as_ref());
        let pass = controller.conclude_pass(state.interview())?;
        state.mark_digested_concludes();
        self.run_digest_pass(state, pass).await
    }

    async fn run_digest_pass(
        &self,
        state: &mut ConversationState,
        pass: Option<super::digest::DigestPass>,
    ) -> Result<StepOutcome, InterviewerError> {
        let Some(pass) = pass else {
            return Ok(StepOutcome::Continue(EngineNode::Think));
        };

        state.push_message(TranscriptMessage::system(pass.instruction));
        let tools = [pass.tool];
        let turn = self.chat_model.invoke(state.messages(), &tools).await?;
        let message = if turn.has_tool_calls() {
            TranscriptMessage::assistant_with_tools(turn.content, turn.tool_calls)
        } else {
            TranscriptMessage::assistant(turn.content)
        };
        let next = if message.has_tool_calls() {
            EngineNode::Tools
        } else {
            EngineNode::Think
        };
        state.push_message(message);
        Ok(StepOutcome::Continue(next))
    }

    /// Node: suspend, yielding the assistant's text to the caller.
    async fn listen(&self, state: &mut ConversationState) -> Result<String, InterviewerError> {
        let message = state.last_message().ok_or_else(|| {
            InterviewerError::StateMachine("listen reached with an empty transcript".to_string())
        })?;
        if message.role() != Role::Assistant || message.has_tool_calls() {
            return Err(InterviewerError::StateMachine(format!(
                "listen requires a plain assistant message, got {:?}",
                message.role()
            )));
        }
        let feedback = message.content().trim().to_string();

        *self.handle.write().await = state.interview().clone();
        self.checkpoints.put(&self.thread_id, state).await?;
        Ok(feedback)
    }

    /// Node: copy final state to the caller's handle and stop.
    async fn teardown(&self, state: &mut ConversationState) -> Result<String, InterviewerError> {
        tracing::debug!(thread = %self.thread_id, "teardown");
        state.mark_concluded();
        *self.handle.write().await = state.interview().clone();
        self.checkpoints.put(&self.thread_id, state).await?;
        Ok(state.last_assistant_text().unwrap_or_default().to_string())
    }
}

fn resolve_temperature(model_id: &str, requested: Option<f32>) -> Option<f32> {
    if FIXED_TEMPERATURE_MODELS.contains(&model_id) {
        None
    } else {
        Some(requested.unwrap_or(0.0))
    }
}

fn strip_model_prefix(model_id: &str) -> Result<&str, InterviewerError> {
    model_id.strip_prefix(MODEL_ID_PREFIX).ok_or_else(|| {
        InterviewerError::Config(DomainError::new(
            crate::domain::foundation::ErrorCode::InvalidModelId,
            format!("LLM ID must start with \"openai:\", got '{}'", model_id),
        ))
    })
}
