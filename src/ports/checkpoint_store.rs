//! Checkpoint Store Port - Interface for persisting conversation state.
//!
//! Snapshots are keyed by an opaque thread identifier so a conversation
//! can pause and resume across process boundaries. The core never deletes
//! checkpoints on its own; retention belongs to the caller. Stores must
//! provide at least per-key atomicity.

use async_trait::async_trait;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ThreadId;

/// Errors that can occur during checkpoint operations
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("Failed to serialize state: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize state: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting and loading conversation snapshots
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the snapshot for a thread, if one exists.
    async fn get(&self, thread_id: &ThreadId) -> Result<Option<ConversationState>, CheckpointError>;

    /// Save the snapshot for a thread, replacing any previous one.
    async fn put(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<(), CheckpointError>;

    /// Check whether a snapshot exists for a thread.
    async fn exists(&self, thread_id: &ThreadId) -> Result<bool, CheckpointError> {
        Ok(self.get(thread_id).await?.is_some())
    }

    /// Delete the snapshot for a thread. Exposed for callers that own
    /// retention; the core never calls this.
    async fn delete(&self, thread_id: &ThreadId) -> Result<(), CheckpointError>;
}
