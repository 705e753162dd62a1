//! Conversation state - the checkpointable snapshot of one thread.

use serde::{Deserialize, Serialize};

use crate::domain::interview::Interview;

use super::message::{Role, TranscriptMessage};

/// Everything the orchestrator needs to resume a conversation: the
/// transcript, the working interview, and the monotonic digestion flags.
///
/// Snapshots are serialized to the checkpoint store between turns and
/// merged by [`merge_states`](super::merge::merge_states) when two
/// execution paths produced divergent copies of the same thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Ordered message log.
    messages: Vec<TranscriptMessage>,

    /// The working interview this conversation fills in.
    interview: Interview,

    /// Set once the confidential digestion pass has run.
    #[serde(default)]
    digested_confidentials: bool,

    /// Set once the conclude digestion pass has run.
    #[serde(default)]
    digested_concludes: bool,

    /// Set by teardown. A concluded conversation performs no more turns.
    #[serde(default)]
    concluded: bool,
}

impl ConversationState {
    /// Creates an empty state around a fresh interview.
    pub fn new(interview: Interview) -> Self {
        Self {
            messages: Vec::new(),
            interview,
            digested_confidentials: false,
            digested_concludes: false,
            concluded: false,
        }
    }

    /// Returns the message log.
    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    /// Returns the most recent message.
    pub fn last_message(&self) -> Option<&TranscriptMessage> {
        self.messages.last()
    }

    /// Appends a message to the log.
    pub fn push_message(&mut self, message: TranscriptMessage) {
        self.messages.push(message);
    }

    /// Inserts the system prompt at the front of the log.
    pub fn prepend_system_message(&mut self, message: TranscriptMessage) {
        self.messages.insert(0, message);
    }

    /// Counts system messages in the log.
    pub fn system_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.role() == Role::System)
            .count()
    }

    /// Content of the most recent assistant message with text, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role() == Role::Assistant && !message.content().is_empty())
            .map(|message| message.content())
    }

    /// Returns the working interview.
    pub fn interview(&self) -> &Interview {
        &self.interview
    }

    /// Returns the working interview mutably.
    pub fn interview_mut(&mut self) -> &mut Interview {
        &mut self.interview
    }

    /// Returns true once the confidential digestion pass has run.
    pub fn digested_confidentials(&self) -> bool {
        self.digested_confidentials
    }

    /// Marks the confidential digestion pass as done. Monotonic.
    pub fn mark_digested_confidentials(&mut self) {
        self.digested_confidentials = true;
    }

    /// Returns true once the conclude digestion pass has run.
    pub fn digested_concludes(&self) -> bool {
        self.digested_concludes
    }

    /// Marks the conclude digestion pass as done. Monotonic.
    pub fn mark_digested_concludes(&mut self) {
        self.digested_concludes = true;
    }

    /// Returns true once teardown has run.
    pub fn is_concluded(&self) -> bool {
        self.concluded
    }

    /// Marks the conversation concluded. Monotonic.
    pub fn mark_concluded(&mut self) {
        self.concluded = true;
    }
}
