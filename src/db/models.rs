//! Database models
//!
//! Shared row types for the queue and history tables. These double as the
//! wire representation of queue entries, so field names follow the
//! client-facing protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One queued media reference with display metadata.
///
/// `id` is unique across the live queue and the current item. A removed
/// or finished id may be reused by a later entry. `media_ref` is derived
/// deterministically from `source_url` and is never empty for an accepted
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueueEntry {
    pub id: i64,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "videoId")]
    pub media_ref: String,
    pub title: String,
    pub duration: String,
}

/// Append-only record of a finished item.
///
/// Created exactly when an item leaves CurrentItem as finished; never
/// mutated, only deletable via the history API. `record_id` is the
/// store-assigned key: the same entry id can finish more than once, so
/// `id` alone does not identify a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryRecord {
    /// Store-assigned record key; 0 until the record has been persisted
    #[serde(rename = "recordId")]
    pub record_id: i64,
    pub id: i64,
    #[serde(rename = "url")]
    pub source_url: String,
    #[serde(rename = "videoId")]
    pub media_ref: String,
    pub title: String,
    #[serde(rename = "playedAt")]
    pub played_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Archive a queue entry at the moment it finished playing.
    pub fn from_entry(entry: &QueueEntry, played_at: DateTime<Utc>) -> Self {
        Self {
            record_id: 0,
            id: entry.id,
            source_url: entry.source_url.clone(),
            media_ref: entry.media_ref.clone(),
            title: entry.title.clone(),
            played_at,
        }
    }
}
