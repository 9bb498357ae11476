//! History table queries
//!
//! History rows are append-only; the only mutation is an explicit delete
//! through the history API.

use sqlx::{Pool, Sqlite};
use tracing::debug;

use super::models::HistoryRecord;
use crate::error::{Error, Result};

/// Archive one finished item.
pub async fn insert(pool: &Pool<Sqlite>, record: &HistoryRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO history (id, source_url, media_ref, title, played_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id)
    .bind(&record.source_url)
    .bind(&record.media_ref)
    .bind(&record.title)
    .bind(record.played_at.to_rfc3339())
    .execute(pool)
    .await?;

    debug!("archived entry {} to history", record.id);
    Ok(())
}

/// List all records, most recently played first.
pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<HistoryRecord>> {
    let records = sqlx::query_as::<_, HistoryRecord>(
        r#"
        SELECT record_id, id, source_url, media_ref, title, played_at
        FROM history
        ORDER BY played_at DESC, record_id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Delete one record by its store-assigned record key.
pub async fn delete(pool: &Pool<Sqlite>, record_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM history WHERE record_id = ?")
        .bind(record_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("history record {record_id}")));
    }

    debug!("deleted history record {}", record_id);
    Ok(())
}
