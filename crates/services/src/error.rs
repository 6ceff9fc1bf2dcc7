//! Shared error types for the services crate.

use thiserror::Error;

use attempt_core::model::{QuestionId, SnapshotError};
use storage::repository::StorageError;

/// Errors emitted by the restart endpoint client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RestartClientError {
    #[error("restart endpoint returned an empty response body")]
    EmptyResponse,
    #[error("restart request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid restart endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("restart response could not be decoded: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors emitted by `AttemptState` mutators and rehydration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptStateError {
    #[error("assessment preview carries no attempt id")]
    MissingAttemptId,
    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),
    #[error("response kind does not match question {0}")]
    ResponseKindMismatch(QuestionId),
}

/// Errors emitted by `RecoveryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecoveryError {
    #[error(transparent)]
    Client(#[from] RestartClientError),
    #[error(transparent)]
    State(#[from] AttemptStateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
