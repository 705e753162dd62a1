//! Scripted Chat Model - deterministic test double.
//!
//! Plays back a fixed sequence of model turns and records what each call
//! bound and sent, so orchestrator behavior can be asserted without a
//! network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::conversation::{Role, ToolDefinition, TranscriptMessage};
use crate::ports::{ChatModel, ChatModelError, ModelTurn};

/// What one `invoke` call looked like.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    /// Number of messages in the transcript at call time.
    pub message_count: usize,
    /// Names of the tools bound on the call.
    pub bound_tools: Vec<String>,
    /// Contents of the system messages at call time, in order.
    pub system_texts: Vec<String>,
}

/// Chat model that answers from a prepared script.
pub struct ScriptedChatModel {
    turns: Mutex<VecDeque<ModelTurn>>,
    invocations: Mutex<Vec<RecordedInvocation>>,
}

impl ScriptedChatModel {
    /// Creates a model that plays the given turns in order.
    pub fn new(turns: impl IntoIterator<Item = ModelTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().collect()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Returns every recorded invocation so far.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.lock().expect("invocation log poisoned").clone()
    }

    /// Returns the number of unplayed turns left in the script.
    pub fn remaining_turns(&self) -> usize {
        self.turns.lock().expect("script poisoned").len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn invoke(
        &self,
        messages: &[TranscriptMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, ChatModelError> {
        let record = RecordedInvocation {
            message_count: messages.len(),
            bound_tools: tools.iter().map(|tool| tool.name().to_string()).collect(),
            system_texts: messages
                .iter()
                .filter(|message| message.role() == Role::System)
                .map(|message| message.content().to_string())
                .collect(),
        };
        self.invocations
            .lock()
            .expect("invocation log poisoned")
            .push(record);

        self.turns
            .lock()
            .expect("script poisoned")
            .pop_front()
            .ok_or_else(|| ChatModelError::InvalidRequest("script exhausted".to_string()))
    }
}
