//! In-Memory Checkpoint Store Adapter
//!
//! Stores conversation snapshots in memory. The default store for fresh
//! interviewers, and useful for tests; snapshots die with the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ThreadId;
use crate::ports::{CheckpointError, CheckpointStore};

/// In-memory storage for conversation snapshots
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    states: Arc<RwLock<HashMap<String, ConversationState>>>,
}

impl InMemoryCheckpointStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored snapshots (useful for tests)
    pub async fn clear(&self) {
        self.states.write().await.clear();
    }

    /// Get the number of stored snapshots
    pub async fn count(&self) -> usize {
        self.states.read().await.len()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn get(&self, thread_id: &ThreadId) -> Result<Option<ConversationState>, CheckpointError> {
        let states = self.states.read().await;
        Ok(states.get(thread_id.as_str()).cloned())
    }

    async fn put(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<(), CheckpointError> {
        let mut states = self.states.write().await;
        states.insert(thread_id.as_str().to_string(), state.clone());
        Ok(())
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<(), CheckpointError> {
        self.states.write().await.remove(thread_id.as_str());
        Ok(())
    }
}
