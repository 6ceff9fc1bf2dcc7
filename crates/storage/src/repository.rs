use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use attempt_core::model::{
    AssessmentId, AssessmentPreview, AttemptId, AttemptSnapshot, AttemptWindow,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Server-returned state for one attempt, kept as a single record.
///
/// A restart hands back three pieces of server state (the fresh preview, the
/// start/end window, and a status acknowledgment); storing them as one record
/// means one upsert, so the local store can never hold a partially updated
/// restart result.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerStateRecord {
    pub attempt_id: AttemptId,
    pub assessment_id: AssessmentId,
    pub preview: AssessmentPreview,
    pub window: AttemptWindow,
    pub status_ack: serde_json::Value,
    pub saved_at: DateTime<Utc>,
}

/// Repository contract for locally persisted attempt snapshots.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Persist or replace the snapshot for an attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(
        &self,
        attempt_id: &AttemptId,
        snapshot: &AttemptSnapshot,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Fetch the snapshot for an attempt, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for connection or deserialization failures; an
    /// absent snapshot is `Ok(None)`, not an error.
    async fn load_snapshot(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<AttemptSnapshot>, StorageError>;

    /// Drop the snapshot for an attempt. Deleting an absent snapshot is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete cannot be executed.
    async fn delete_snapshot(&self, attempt_id: &AttemptId) -> Result<(), StorageError>;
}

/// Repository contract for server-returned restart state.
#[async_trait]
pub trait ServerStateRepository: Send + Sync {
    /// Persist or replace the server state record for an attempt as a single
    /// atomic upsert.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_server_state(&self, record: &ServerStateRecord) -> Result<(), StorageError>;

    /// Fetch the server state record for an attempt, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for connection or deserialization failures.
    async fn load_server_state(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<ServerStateRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<AttemptId, AttemptSnapshot>>>,
    server_states: Arc<Mutex<HashMap<AttemptId, ServerStateRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(HashMap::new())),
            server_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn save_snapshot(
        &self,
        attempt_id: &AttemptId,
        snapshot: &AttemptSnapshot,
        _saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(attempt_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn load_snapshot(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<AttemptSnapshot>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(attempt_id).cloned())
    }

    async fn delete_snapshot(&self, attempt_id: &AttemptId) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(attempt_id);
        Ok(())
    }
}

#[async_trait]
impl ServerStateRepository for InMemoryRepository {
    async fn save_server_state(&self, record: &ServerStateRecord) -> Result<(), StorageError> {
        let mut guard = self
            .server_states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.attempt_id.clone(), record.clone());
        Ok(())
    }

    async fn load_server_state(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<ServerStateRecord>, StorageError> {
        let guard = self
            .server_states
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(attempt_id).cloned())
    }
}

/// Aggregates snapshot and server-state repositories behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
    pub server_states: Arc<dyn ServerStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(repo.clone());
        let server_states: Arc<dyn ServerStateRepository> = Arc::new(repo);
        Self {
            snapshots,
            server_states,
        }
    }
}
