//! HTTP request handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::api::AppContext;
use crate::db::history;
use crate::db::models::{HistoryRecord, QueueEntry};
use crate::error::Result;
use crate::media;
use crate::resolver::{PlaylistMetadata, VideoMetadata};

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub queue: Vec<QueueEntry>,
    pub current: Option<QueueEntry>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// GET /api/queue - queue snapshot plus current item
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<QueueResponse> {
    Json(QueueResponse {
        queue: ctx.engine.snapshot().await,
        current: ctx.engine.current().await,
    })
}

/// GET /api/video/:media_ref - resolve display metadata for one video
pub async fn get_video_metadata(
    State(ctx): State<AppContext>,
    Path(media_ref): Path<String>,
) -> Result<Json<VideoMetadata>> {
    media::validate_ref(&media_ref)?;
    let metadata = ctx.resolver.video(&media_ref).await?;
    Ok(Json(metadata))
}

/// GET /api/playlist/:playlist_ref - resolve a playlist listing
pub async fn get_playlist(
    State(ctx): State<AppContext>,
    Path(playlist_ref): Path<String>,
) -> Result<Json<PlaylistMetadata>> {
    media::validate_playlist_ref(&playlist_ref)?;
    let listing = ctx.resolver.playlist(&playlist_ref).await?;
    Ok(Json(listing))
}

/// GET /api/history - all play history records, newest first
pub async fn get_history(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<HistoryRecord>>> {
    let records = history::list(&ctx.db_pool).await?;
    Ok(Json(records))
}

/// DELETE /api/history/:id - remove one history record by its record key
pub async fn delete_history(
    State(ctx): State<AppContext>,
    Path(record_id): Path<i64>,
) -> Result<Json<StatusResponse>> {
    history::delete(&ctx.db_pool, record_id).await?;
    info!("history record {} deleted by user", record_id);
    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
    }))
}
