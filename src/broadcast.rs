//! Fan-out broadcaster for real-time client updates

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::events::ServerEvent;

/// Distributes authoritative state changes to all connected sessions.
///
/// Broadcast is at-least-once and unordered-safe: every message carries
/// the full queue or a complete item, so missed intermediate updates are
/// corrected by the next one.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<ServerEvent>,
}

impl Broadcaster {
    /// Create a new broadcaster.
    ///
    /// `capacity` is the number of events buffered per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    /// Broadcast an event to all connected sessions, ignoring the case
    /// where no session is connected.
    pub fn send(&self, event: ServerEvent) {
        match self.tx.send(event) {
            Ok(count) => debug!("broadcast event to {} sessions", count),
            Err(_) => debug!("broadcast with no connected sessions"),
        }
    }

    /// Subscribe a new session to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Number of currently connected sessions.
    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
