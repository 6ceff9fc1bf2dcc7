use chrono::{DateTime, Utc};
use sqlx::Row;

use attempt_core::model::{AttemptId, AttemptSnapshot};

use super::SqliteRepository;
use crate::repository::{SnapshotRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn save_snapshot(
        &self,
        attempt_id: &AttemptId,
        snapshot: &AttemptSnapshot,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let document = serde_json::to_string(snapshot).map_err(ser)?;

        sqlx::query(
            r"
                INSERT INTO attempt_snapshots (attempt_id, assessment_id, snapshot, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(attempt_id) DO UPDATE SET
                    assessment_id = excluded.assessment_id,
                    snapshot = excluded.snapshot,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(attempt_id.as_str())
        .bind(snapshot.assessment.assessment_id.as_str())
        .bind(document)
        .bind(saved_at)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn load_snapshot(
        &self,
        attempt_id: &AttemptId,
    ) -> Result<Option<AttemptSnapshot>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT snapshot
                FROM attempt_snapshots
                WHERE attempt_id = ?1
            ",
        )
        .bind(attempt_id.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let document: String = row.try_get("snapshot").map_err(ser)?;
        let snapshot = serde_json::from_str(&document).map_err(ser)?;
        Ok(Some(snapshot))
    }

    async fn delete_snapshot(&self, attempt_id: &AttemptId) -> Result<(), StorageError> {
        sqlx::query(
            r"
                DELETE FROM attempt_snapshots
                WHERE attempt_id = ?1
            ",
        )
        .bind(attempt_id.as_str())
        .execute(self.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }
}
