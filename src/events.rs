//! Wire event types for the real-time channel
//!
//! Every server→client message carries either the full queue or a complete
//! entry, so a client that misses an intermediate update is corrected by
//! the next one.

use serde::{Deserialize, Serialize};

use crate::db::models::QueueEntry;

/// Server→client events, broadcast to all sessions (except `Error`,
/// which the gateway sends to the originating session only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full snapshot, replaces the client's view
    QueueUpdate(Vec<QueueEntry>),

    /// New current item after an advance
    PlayVideo(QueueEntry),

    /// Current item replayed to a newly joined session
    VideoPlaying(QueueEntry),

    /// Current item cleared
    StopVideo,

    /// Command rejected
    Error { message: String },
}

/// Client→server commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Request Enqueue
    AddVideo(AddVideoRequest),

    /// Request Remove
    DeleteVideo(i64),

    /// Request RemoveMany
    DeleteMultipleVideos(Vec<i64>),

    /// Request Advance (natural completion)
    VideoFinished,

    /// Request Advance (manual)
    PlayNext,
}

/// Entry-shaped payload of `add_video`. The media ref is always derived
/// server-side from the URL; a client-sent ref is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddVideoRequest {
    /// Client-assigned id; the engine assigns one when absent
    #[serde(default)]
    pub id: Option<i64>,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl ServerEvent {
    /// Serialize for transmission; events are plain serde types, so this
    /// only fails on a programming error.
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_events_use_protocol_names() {
        let json = ServerEvent::StopVideo.to_json().unwrap();
        assert!(json.contains(r#""event":"stop_video""#));

        let entry = QueueEntry {
            id: 1,
            source_url: "https://youtu.be/dQw4w9WgXcQ".into(),
            media_ref: "dQw4w9WgXcQ".into(),
            title: "A".into(),
            duration: "Unknown".into(),
        };
        let json = ServerEvent::PlayVideo(entry).to_json().unwrap();
        assert!(json.contains(r#""event":"play_video""#));
        assert!(json.contains(r#""videoId":"dQw4w9WgXcQ""#));
    }

    #[test]
    fn client_commands_parse_protocol_names() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"delete_video","data":42}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::DeleteVideo(42)));

        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"video_finished"}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::VideoFinished));

        let cmd: ClientCommand = serde_json::from_str(
            r#"{"event":"add_video","data":{"id":7,"url":"https://youtu.be/dQw4w9WgXcQ","title":"A","duration":"3:32"}}"#,
        )
        .unwrap();
        match cmd {
            ClientCommand::AddVideo(req) => {
                assert_eq!(req.id, Some(7));
                assert_eq!(req.title.as_deref(), Some("A"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
