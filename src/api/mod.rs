//! HTTP boundary
//!
//! Axum router for the WebSocket gateway, metadata lookups, and history
//! browsing. Queue mutations happen only over the WebSocket channel.

pub mod handlers;

use axum::extract::State;
use axum::response::Json;
use axum::routing::{delete, get};
use axum::Router;
use serde_json::json;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::broadcast::Broadcaster;
use crate::engine::QueueEngine;
use crate::gateway;
use crate::resolver::MetadataResolver;

/// Shared application context passed to all handlers.
#[derive(Clone)]
pub struct AppContext {
    pub engine: QueueEngine,
    pub broadcaster: Broadcaster,
    pub db_pool: Pool<Sqlite>,
    pub resolver: Arc<dyn MetadataResolver>,
    pub port: u16,
}

/// Build the application router.
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(gateway::ws_handler))
        .route("/api/queue", get(handlers::get_queue))
        .route("/api/video/:media_ref", get(handlers::get_video_metadata))
        .route("/api/playlist/:playlist_ref", get(handlers::get_playlist))
        .route("/api/history", get(handlers::get_history))
        .route("/api/history/:id", delete(handlers::delete_history))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// GET /health - health check endpoint
async fn health(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "vidsync",
        "version": env!("CARGO_PKG_VERSION"),
        "port": ctx.port,
        "sessions": ctx.broadcaster.session_count(),
    }))
}
