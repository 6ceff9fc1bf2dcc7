use sqlx::Row;

use attempt_core::model::{AssessmentId, AttemptId};

use super::SqliteRepository;
use crate::repository::{ServerStateRecord, ServerStateRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn map_record(row: &sqlx::sqlite::SqliteRow) -> Result<ServerStateRecord, StorageError> {
    let attempt_id: String = row.try_get("attempt_id").map_err(ser)?;
    let assessment_id: String = row.try_get("assessment_id").map_err(ser)?;
    let preview: String = row.try_get("preview").map_err(ser)?;
    let window: String = row.try_get("window").map_err(ser)?;
    let status_ack: String = row.try_get("status_ack").map_err(ser)?;
    let saved_at = row.try_get("saved_at").map_err(ser)?;

    Ok(ServerStateRecord {
        attempt_id: AttemptId::new(attempt_id).map_err(ser)?,
        assessment_id: AssessmentId::new(assessment_id).map_err(ser)?,
        preview: serde_json::from_str(&preview).map_err(ser)?,
        window: serde_json::from_str(&window).map_err(ser)?,
        status_ack: serde_json::from_str(&status_ack).map_err(ser)?,
        saved_at,
    })
}

#[async_trait::async_trait]
impl ServerStateRepository for SqliteRepository {
    async fn save_server_state(&self, record: &ServerStateRecord) -> Result<(), StorageError> {
        let preview = serde_json::to_string(&record.preview).map_err(ser)?;
        let window = serde_json::to_string(&record.window).map_err(ser)?;
        let status_ack = serde_json::to_string(&record.status_ack).map_err(ser)?;

        // Single upsert: all server-returned state lands in one row or not at
        // all.
        sqlx::query(
            r"
                INSERT INTO server_states (
                    attempt_id, assessment_id, preview, window, status_ack, saved_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(attempt_id) DO UPDATE SET
                    assessment_id = excluded.assessment_id,
                    preview = excluded.preview,
                    window = excluded.window,
                    status_ack = excluded.status_ack,
                    saved_at = excluded.saved_at
            ",
        )
        .bind(record.attempt_id.as_str())
        .bind(record.assessment_id.as_str())
        .bind(preview)
        .bind(window)
        .bind(status_ack)
        .bind(record.saved_at)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn load_server_state(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<ServerStateRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT attempt_id, assessment_id, preview, window, status_ack, saved_at
                FROM server_states
                WHERE attempt_id = ?1
            ",
        )
        .bind(attempt_id.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(conn)?;

        row.as_ref().map(map_record).transpose()
    }
}
