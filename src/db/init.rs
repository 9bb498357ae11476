//! Database initialization

use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::error::Result;

/// Create the queue and history tables when missing. Idempotent.
pub async fn initialize_database(pool: &Pool<Sqlite>) -> Result<()> {
    info!("initializing database structures");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS queue (
            id         INTEGER PRIMARY KEY,
            source_url TEXT NOT NULL,
            media_ref  TEXT NOT NULL,
            title      TEXT NOT NULL,
            duration   TEXT NOT NULL DEFAULT 'Unknown'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history (
            record_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            id         INTEGER NOT NULL,
            source_url TEXT NOT NULL,
            media_ref  TEXT NOT NULL,
            title      TEXT NOT NULL,
            played_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("database initialization complete");
    Ok(())
}
