use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use std::collections::HashSet;
use trivia_core::daily::date_key;
use trivia_core::model::{PlayerId, QuestionId};

use super::{
    SqliteRepository,
    mapping::{conn, ser},
};
use crate::repository::{PlayerRepository, StorageError};

#[async_trait::async_trait]
impl PlayerRepository for SqliteRepository {
    async fn get_rating(&self, player: &PlayerId) -> Result<Option<i64>, StorageError> {
        let row = sqlx::query("SELECT rating FROM player_ratings WHERE player_id = ?1")
            .bind(player.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|r| r.try_get::<i64, _>("rating").map_err(ser))
            .transpose()
    }

    async fn set_rating(
        &self,
        player: &PlayerId,
        rating: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO player_ratings (player_id, rating, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(player_id) DO UPDATE SET
                    rating = excluded.rating,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(player.as_str())
        .bind(rating)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn seen_on(
        &self,
        player: &PlayerId,
        day: NaiveDate,
    ) -> Result<HashSet<QuestionId>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT question_id
                FROM seen_questions
                WHERE player_id = ?1 AND seen_on = ?2
            ",
        )
        .bind(player.as_str())
        .bind(date_key(day))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = HashSet::with_capacity(rows.len());
        for row in rows {
            out.insert(QuestionId::new(
                row.try_get::<String, _>("question_id").map_err(ser)?,
            ));
        }
        Ok(out)
    }

    async fn mark_seen(
        &self,
        player: &PlayerId,
        day: NaiveDate,
        id: &QuestionId,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO seen_questions (player_id, seen_on, question_id)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(player_id, seen_on, question_id) DO NOTHING
            ",
        )
        .bind(player.as_str())
        .bind(date_key(day))
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
