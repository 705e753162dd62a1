//! File Checkpoint Store Adapter
//!
//! Persists one JSON document per thread under a base directory, so
//! conversations survive process restarts. Thread identifiers are
//! arbitrary strings; filenames go through the field-name codec, which
//! already provides a safe, collision-free, round-trippable mapping.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::domain::conversation::{codec, ConversationState};
use crate::domain::foundation::ThreadId;
use crate::ports::{CheckpointError, CheckpointStore};

/// File-backed storage for conversation snapshots
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    base_dir: PathBuf,
}

impl FileCheckpointStore {
    /// Create a store rooted at the given directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, thread_id: &ThreadId) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", codec::encode(thread_id.as_str())))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn get(&self, thread_id: &ThreadId) -> Result<Option<ConversationState>, CheckpointError> {
        let path = self.path_for(thread_id);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CheckpointError::IoError(err.to_string())),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| CheckpointError::DeserializationFailed(err.to_string()))
    }

    async fn put(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<(), CheckpointError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|err| CheckpointError::IoError(err.to_string()))?;

        let contents = serde_json::to_string_pretty(state)
            .map_err(|err| CheckpointError::SerializationFailed(err.to_string()))?;

        fs::write(self.path_for(thread_id), contents)
            .await
            .map_err(|err| CheckpointError::IoError(err.to_string()))
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<(), CheckpointError> {
        match fs::remove_file(self.path_for(thread_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CheckpointError::IoError(err.to_string())),
        }
    }
}
