//! The recovery workflow: reconcile a local snapshot with server state.

use std::sync::Arc;

use tracing::{debug, error, warn};

use attempt_core::Clock;
use attempt_core::model::{AssessmentId, AssessmentPreview, AttemptId};
use storage::repository::{
    ServerStateRecord, ServerStateRepository, SnapshotRepository, Storage,
};

use crate::attempt::client::RestartApi;
use crate::attempt::format::restart_request;
use crate::attempt::state::AttemptState;
use crate::attempt::wire::{RestartRequestBody, RestartResponse};
use crate::error::RecoveryError;

/// How a resumed attempt's state was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// A local snapshot existed and was reconciled with the server.
    Recovered,
    /// No local snapshot existed; the attempt restarted from server state
    /// alone. Callers can use this to tell a fresh start from recovered
    /// progress.
    FreshStart,
}

/// A resumed attempt together with how its state was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredAttempt {
    pub state: AttemptState,
    pub outcome: RecoveryOutcome,
}

/// Orchestrates the attempt lifecycle against the restart endpoint and the
/// local store: begin, checkpoint, resume after an interruption, discard.
///
/// Resume issues exactly one restart call; nothing is retried. All failures
/// propagate as typed `RecoveryError` values, and a failure before the
/// persist step leaves the local store untouched.
#[derive(Clone)]
pub struct RecoveryService {
    clock: Clock,
    api: Arc<dyn RestartApi>,
    snapshots: Arc<dyn SnapshotRepository>,
    server_states: Arc<dyn ServerStateRepository>,
}

impl RecoveryService {
    #[must_use]
    pub fn new(
        clock: Clock,
        api: Arc<dyn RestartApi>,
        snapshots: Arc<dyn SnapshotRepository>,
        server_states: Arc<dyn ServerStateRepository>,
    ) -> Self {
        Self {
            clock,
            api,
            snapshots,
            server_states,
        }
    }

    #[must_use]
    pub fn with_storage(clock: Clock, api: Arc<dyn RestartApi>, storage: &Storage) -> Self {
        Self::new(
            clock,
            api,
            Arc::clone(&storage.snapshots),
            Arc::clone(&storage.server_states),
        )
    }

    /// Begin a brand-new attempt and persist its first snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RecoveryError` if the preview carries no attempt id or the
    /// snapshot cannot be stored.
    pub async fn start_attempt(
        &self,
        preview: AssessmentPreview,
    ) -> Result<AttemptState, RecoveryError> {
        let now = self.clock.now();
        let state = AttemptState::begin(preview, now)?;
        self.snapshots
            .save_snapshot(state.attempt_id(), &state.snapshot(), now)
            .await?;
        debug!(attempt_id = %state.attempt_id(), "attempt started");
        Ok(state)
    }

    /// Persist the current live state; the caller drives the cadence.
    ///
    /// # Errors
    ///
    /// Returns `RecoveryError::Storage` if the snapshot cannot be stored.
    pub async fn checkpoint(&self, state: &AttemptState) -> Result<(), RecoveryError> {
        self.snapshots
            .save_snapshot(state.attempt_id(), &state.snapshot(), self.clock.now())
            .await?;
        Ok(())
    }

    /// Drop the snapshot of a superseded attempt.
    ///
    /// # Errors
    ///
    /// Returns `RecoveryError::Storage` if the delete cannot be executed.
    pub async fn discard(&self, attempt_id: &AttemptId) -> Result<(), RecoveryError> {
        self.snapshots.delete_snapshot(attempt_id).await?;
        Ok(())
    }

    /// Resume an interrupted attempt.
    ///
    /// Reads the local snapshot (an absent snapshot degrades to a zeroed
    /// request body and a `FreshStart` outcome), issues one restart call,
    /// persists the server's reply as a single record, and returns the
    /// rehydrated state. The reply is validated before anything is written:
    /// a preview without an attempt id fails with no store writes.
    ///
    /// # Errors
    ///
    /// Returns `RecoveryError` for client, validation, and storage failures.
    pub async fn resume(
        &self,
        assessment_id: &AssessmentId,
        attempt_id: &AttemptId,
    ) -> Result<RecoveredAttempt, RecoveryError> {
        let (body, outcome) = self.prepare_body(attempt_id).await?;

        let response = match self.api.restart_attempt(assessment_id, attempt_id, &body).await {
            Ok(response) => response,
            Err(e) => {
                error!(attempt_id = %attempt_id, error = %e, "restart call failed");
                return Err(e.into());
            }
        };

        // Build the replacement state before touching the store, so a reply
        // without an attempt id writes nothing.
        let state = match outcome {
            RecoveryOutcome::FreshStart => {
                AttemptState::begin(response.preview_response.clone(), self.clock.now())
            }
            RecoveryOutcome::Recovered => {
                AttemptState::from_restart(response.preview_response.clone(), &body)
            }
        };
        let state = match state {
            Ok(state) => state,
            Err(e) => {
                error!(attempt_id = %attempt_id, error = %e, "restart reply rejected");
                return Err(e.into());
            }
        };

        self.persist(assessment_id, &response, &state).await?;
        debug!(attempt_id = %state.attempt_id(), ?outcome, "attempt resumed");
        Ok(RecoveredAttempt { state, outcome })
    }

    /// Resume an interrupted attempt, rehydrating the caller's state in
    /// place. The state is replaced wholesale and only on success.
    ///
    /// # Errors
    ///
    /// Returns `RecoveryError` for client, validation, and storage failures;
    /// on error the caller's state is left unchanged.
    pub async fn resume_into(
        &self,
        assessment_id: &AssessmentId,
        attempt_id: &AttemptId,
        state: &mut AttemptState,
    ) -> Result<RecoveryOutcome, RecoveryError> {
        let recovered = self.resume(assessment_id, attempt_id).await?;
        *state = recovered.state;
        Ok(recovered.outcome)
    }

    async fn prepare_body(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<(RestartRequestBody, RecoveryOutcome), RecoveryError> {
        match self.snapshots.load_snapshot(attempt_id).await? {
            Some(snapshot) => {
                debug!(attempt_id = %attempt_id, "formatting local snapshot for restart");
                Ok((restart_request(&snapshot), RecoveryOutcome::Recovered))
            }
            None => {
                warn!(attempt_id = %attempt_id, "no local snapshot; restarting with a zeroed report");
                Ok((RestartRequestBody::empty(), RecoveryOutcome::FreshStart))
            }
        }
    }

    async fn persist(
        &self,
        assessment_id: &AssessmentId,
        response: &RestartResponse,
        state: &AttemptState,
    ) -> Result<(), RecoveryError> {
        let saved_at = self.clock.now();

        let record = ServerStateRecord {
            attempt_id: state.attempt_id().clone(),
            assessment_id: assessment_id.clone(),
            preview: response.preview_response.clone(),
            window: response.start_assessment_response,
            status_ack: response.update_status_response.clone(),
            saved_at,
        };
        self.server_states.save_server_state(&record).await?;

        self.snapshots
            .save_snapshot(state.attempt_id(), &state.snapshot(), saved_at)
            .await?;
        Ok(())
    }
}
