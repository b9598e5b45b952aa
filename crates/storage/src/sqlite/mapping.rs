use sqlx::Row;
use trivia_core::model::{PlayerId, SessionMode, SessionSummary};

use crate::repository::{QuestionStats, SessionSummaryRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_stats_row(row: &sqlx::sqlite::SqliteRow) -> Result<QuestionStats, StorageError> {
    Ok(QuestionStats {
        shown: u32_from_i64("shown", row.try_get::<i64, _>("shown").map_err(ser)?)?,
        correct: u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?,
    })
}

pub(crate) fn map_summary_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionSummary, StorageError> {
    let player_id = PlayerId::new(row.try_get::<String, _>("player_id").map_err(ser)?);
    let mode: SessionMode = row
        .try_get::<String, _>("mode")
        .map_err(ser)?
        .parse()
        .map_err(ser)?;

    SessionSummary::from_persisted(
        player_id,
        mode,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
        u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?,
        u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?,
        row.try_get("rating_before").map_err(ser)?,
        row.try_get("rating_after").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(SessionSummaryRow::new(id, map_summary_row(row)?))
}
