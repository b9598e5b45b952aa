use trivia_core::model::{PlayerId, SessionSummary};

use super::{
    SqliteRepository,
    mapping::{conn, map_summary_row, map_summary_row_with_id},
};
use crate::repository::{SessionSummaryRepository, SessionSummaryRow, StorageError};

#[async_trait::async_trait]
impl SessionSummaryRepository for SqliteRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO session_summaries (
                    player_id, mode, started_at, completed_at,
                    total, correct, rating_before, rating_after
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(summary.player_id().as_str())
        .bind(summary.mode().as_str())
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .bind(i64::from(summary.total()))
        .bind(i64::from(summary.correct()))
        .bind(summary.rating_before())
        .bind(summary.rating_after())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    player_id, mode, started_at, completed_at,
                    total, correct, rating_before, rating_after
                FROM session_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summaries(
        &self,
        player: &PlayerId,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, player_id, mode, started_at, completed_at,
                    total, correct, rating_before, rating_after
                FROM session_summaries
                WHERE player_id = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(player.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_summary_row_with_id(&row)?);
        }
        Ok(out)
    }
}
