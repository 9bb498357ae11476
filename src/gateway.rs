//! Session gateway
//!
//! WebSocket endpoint for client sessions. A joining session receives the
//! queue snapshot and, when something is playing, the current item, so it
//! reconstructs full state from two messages with no missed-update window
//! (the broadcast subscription is taken before the snapshot is read).
//! Inbound commands are dispatched into the queue engine; failures go back
//! to the originating session only. Disconnects change no queue state.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::sink::SinkExt;
use futures::stream::{SplitSink, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::api::AppContext;
use crate::engine::AdvanceReason;
use crate::error::Result;
use crate::events::{ClientCommand, ServerEvent};

/// WebSocket upgrade handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(ctx): State<AppContext>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, ctx))
}

/// Main per-session loop.
async fn handle_session(socket: WebSocket, ctx: AppContext) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe first: anything broadcast after this point is queued for
    // this session, so replay + stream covers every state change.
    let mut events = ctx.broadcaster.subscribe();

    info!(
        "session connected, total sessions: {}",
        ctx.broadcaster.session_count()
    );

    let snapshot = ctx.engine.snapshot().await;
    if send_event(&mut sender, &ServerEvent::QueueUpdate(snapshot))
        .await
        .is_err()
    {
        warn!("session dropped before replay completed");
        return;
    }
    if let Some(current) = ctx.engine.current().await {
        if send_event(&mut sender, &ServerEvent::VideoPlaying(current))
            .await
            .is_err()
        {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = dispatch(&ctx, &text).await {
                        debug!("command rejected: {}", e);
                        let error = ServerEvent::Error { message: e.to_string() };
                        if send_event(&mut sender, &error).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
            event = events.recv() => match event {
                Ok(event) => {
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                // A lagged session is corrected by the next full snapshot.
                Err(RecvError::Lagged(skipped)) => {
                    warn!("session lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!(
        "session disconnected, remaining sessions: {}",
        ctx.broadcaster.session_count().saturating_sub(1)
    );
}

/// Parse and execute one client command.
async fn dispatch(ctx: &AppContext, text: &str) -> Result<()> {
    let command: ClientCommand = serde_json::from_str(text)
        .map_err(|e| crate::error::Error::Validation(format!("malformed command: {e}")))?;

    match command {
        ClientCommand::AddVideo(request) => {
            ctx.engine.enqueue(request).await?;
        }
        ClientCommand::DeleteVideo(id) => {
            ctx.engine.remove(id).await?;
        }
        ClientCommand::DeleteMultipleVideos(ids) => {
            ctx.engine.remove_many(&ids).await;
        }
        ClientCommand::VideoFinished => {
            ctx.engine.advance(AdvanceReason::Finished).await;
        }
        ClientCommand::PlayNext => {
            ctx.engine.advance(AdvanceReason::Manual).await;
        }
    }

    Ok(())
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> std::result::Result<(), axum::Error> {
    match event.to_json() {
        Some(json) => sender.send(Message::Text(json)).await,
        None => Ok(()),
    }
}
