//! Queue table queries

use sqlx::{Pool, Sqlite};
use tracing::debug;

use super::models::QueueEntry;
use crate::error::Result;

/// Persist one entry.
pub async fn save(pool: &Pool<Sqlite>, entry: &QueueEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO queue (id, source_url, media_ref, title, duration)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.source_url)
    .bind(&entry.media_ref)
    .bind(&entry.title)
    .bind(&entry.duration)
    .execute(pool)
    .await?;

    debug!("persisted queue entry {}", entry.id);
    Ok(())
}

/// Remove one entry by id. Deleting an absent id is not an error at the
/// store level; the engine has already validated presence.
pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM queue WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    debug!("deleted queue entry {}", id);
    Ok(())
}

/// Load the whole queue in the same order it was persisted. Ids are
/// monotonic-ish, so ascending id order is the play order.
pub async fn load_all(pool: &Pool<Sqlite>) -> Result<Vec<QueueEntry>> {
    let entries = sqlx::query_as::<_, QueueEntry>(
        r#"
        SELECT id, source_url, media_ref, title, duration
        FROM queue
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    debug!("loaded {} entries from queue", entries.len());
    Ok(entries)
}
