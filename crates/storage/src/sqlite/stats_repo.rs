use sqlx::Row;
use trivia_core::model::QuestionId;

use super::{
    SqliteRepository,
    mapping::{conn, map_stats_row, ser},
};
use crate::repository::{QuestionStats, QuestionStatsRepository, StorageError};

#[async_trait::async_trait]
impl QuestionStatsRepository for SqliteRepository {
    async fn record_answer(&self, id: &QuestionId, correct: bool) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO question_stats (question_id, shown, correct)
                VALUES (?1, 1, ?2)
                ON CONFLICT(question_id) DO UPDATE SET
                    shown = shown + 1,
                    correct = correct + excluded.correct
            ",
        )
        .bind(id.as_str())
        .bind(i64::from(correct))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn get_stats(&self, id: &QuestionId) -> Result<QuestionStats, StorageError> {
        let row = sqlx::query("SELECT shown, correct FROM question_stats WHERE question_id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        match row {
            Some(row) => map_stats_row(&row),
            None => Ok(QuestionStats::default()),
        }
    }

    async fn all_stats(&self) -> Result<Vec<(QuestionId, QuestionStats)>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT question_id, shown, correct
                FROM question_stats
                ORDER BY question_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?);
            out.push((id, map_stats_row(&row)?));
        }
        Ok(out)
    }
}
