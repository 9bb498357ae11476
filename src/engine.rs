//! Queue engine
//!
//! The authoritative ordered-queue state machine. All mutations from all
//! sessions are serialized through one Mutex-guarded state; snapshots take
//! the same lock, so reads are always consistent. Events are broadcast
//! while the lock is held, keeping event order identical to mutation
//! order. Durability goes through the ordered store writer and never
//! blocks or reverses an in-memory mutation.

use chrono::Utc;
use sqlx::{Pool, Sqlite};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::broadcast::Broadcaster;
use crate::db::models::{HistoryRecord, QueueEntry};
use crate::db::queue as queue_db;
use crate::db::writer::StoreWriter;
use crate::error::{Error, Result};
use crate::events::{AddVideoRequest, ServerEvent};
use crate::media;

/// Engine states: `Idle` when no current item, `Playing` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Idle,
    Playing,
}

/// Why an advance was requested. Affects logging only; the transition is
/// the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    /// Client reported natural completion (`video_finished`)
    Finished,
    /// Manual skip (`play_next`)
    Manual,
    /// The fixed-duration timer elapsed
    Timer,
}

/// Queue and current item, owned exclusively by the engine.
#[derive(Debug, Default)]
struct EngineState {
    queue: Vec<QueueEntry>,
    current: Option<QueueEntry>,
    /// Bumped on every advance; a pending timer only fires when the epoch
    /// it was armed for is still live
    epoch: u64,
}

impl EngineState {
    fn has_id(&self, id: i64) -> bool {
        self.queue.iter().any(|e| e.id == id)
            || self.current.as_ref().is_some_and(|e| e.id == id)
    }
}

struct EngineShared {
    inner: Mutex<EngineState>,
    broadcaster: Broadcaster,
    store: StoreWriter,
    /// 0 disables the auto-advance timer
    auto_advance_secs: u64,
    /// Abort handle of the pending auto-advance timer, if any
    timer: StdMutex<Option<AbortHandle>>,
}

/// The queue engine. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct QueueEngine {
    shared: Arc<EngineShared>,
}

impl QueueEngine {
    pub fn new(broadcaster: Broadcaster, store: StoreWriter, auto_advance_secs: u64) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                inner: Mutex::new(EngineState::default()),
                broadcaster,
                store,
                auto_advance_secs,
                timer: StdMutex::new(None),
            }),
        }
    }

    /// Repopulate the queue from the store at startup.
    ///
    /// A store failure degrades to an empty queue rather than crashing.
    pub async fn load(&self, pool: &Pool<Sqlite>) {
        match queue_db::load_all(pool).await {
            Ok(entries) => {
                let mut state = self.shared.inner.lock().await;
                info!("restored {} queue entries from store", entries.len());
                state.queue = entries;
            }
            Err(e) => {
                warn!("queue restore failed, starting empty: {}", e);
            }
        }
    }

    /// Append a new entry at the tail of the queue.
    ///
    /// Fails with a validation error when no media ref can be derived from
    /// the URL or when the id collides with the queue or the current item.
    /// On success the entry is persisted (fire-and-forget) and a full
    /// snapshot is broadcast.
    pub async fn enqueue(&self, request: AddVideoRequest) -> Result<QueueEntry> {
        let media_ref = media::extract_video_ref(&request.url)?;

        let mut state = self.shared.inner.lock().await;

        let id = request.id.unwrap_or_else(|| Utc::now().timestamp_millis());
        if state.has_id(id) {
            return Err(Error::Validation(format!("duplicate entry id {id}")));
        }

        let entry = QueueEntry {
            id,
            source_url: request.url,
            media_ref,
            title: request
                .title
                .unwrap_or_else(|| format!("Video {}", state.queue.len() + 1)),
            duration: request.duration.unwrap_or_else(|| "Unknown".to_string()),
        };

        debug!("enqueue entry {} ({})", entry.id, entry.media_ref);
        state.queue.push(entry.clone());
        self.shared.store.save(entry.clone());
        self.shared
            .broadcaster
            .send(ServerEvent::QueueUpdate(state.queue.clone()));

        Ok(entry)
    }

    /// Promote the queue head to the current item.
    ///
    /// Any previous current item is archived to history first. On an empty
    /// queue the engine transitions to `Idle` and broadcasts a stop
    /// signal. Never fails; advancing an idle engine with an empty queue
    /// just re-announces the stop.
    pub async fn advance(&self, reason: AdvanceReason) {
        self.shared.cancel_timer();

        let mut state = self.shared.inner.lock().await;
        let started = self.shared.apply_advance(&mut state, reason);
        let epoch = state.epoch;
        drop(state);

        if started {
            EngineShared::schedule_timer(&self.shared, epoch);
        }
    }

    /// Remove one entry from anywhere in the queue.
    ///
    /// The current item is never removed here; it only leaves through
    /// `advance`. Fails with a not-found error when the id is absent.
    pub async fn remove(&self, id: i64) -> Result<()> {
        let mut state = self.shared.inner.lock().await;

        let index = state
            .queue
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("queue entry {id}")))?;

        state.queue.remove(index);
        debug!("removed entry {} from queue", id);
        self.shared.store.delete(id);
        self.shared
            .broadcaster
            .send(ServerEvent::QueueUpdate(state.queue.clone()));

        Ok(())
    }

    /// Remove a batch of entries; absent ids are silently skipped.
    ///
    /// Emits at most one snapshot broadcast for the whole batch. Returns
    /// the number of entries actually removed.
    pub async fn remove_many(&self, ids: &[i64]) -> usize {
        let mut state = self.shared.inner.lock().await;

        let mut removed = 0;
        for &id in ids {
            if let Some(index) = state.queue.iter().position(|e| e.id == id) {
                state.queue.remove(index);
                self.shared.store.delete(id);
                removed += 1;
            }
        }

        if removed > 0 {
            debug!("removed {} of {} requested entries", removed, ids.len());
            self.shared
                .broadcaster
                .send(ServerEvent::QueueUpdate(state.queue.clone()));
        }

        removed
    }

    /// Ordered copy of the queue, used to replay state to new sessions.
    pub async fn snapshot(&self) -> Vec<QueueEntry> {
        self.shared.inner.lock().await.queue.clone()
    }

    /// The current item, if any.
    pub async fn current(&self) -> Option<QueueEntry> {
        self.shared.inner.lock().await.current.clone()
    }

    /// Current engine mode.
    pub async fn mode(&self) -> EngineMode {
        if self.shared.inner.lock().await.current.is_some() {
            EngineMode::Playing
        } else {
            EngineMode::Idle
        }
    }
}

impl EngineShared {
    /// The transition itself, under the state lock. Returns whether a new
    /// item started playing.
    fn apply_advance(&self, state: &mut EngineState, reason: AdvanceReason) -> bool {
        state.epoch += 1;

        if let Some(finished) = state.current.take() {
            debug!("archiving finished entry {} ({:?})", finished.id, reason);
            self.store
                .archive(HistoryRecord::from_entry(&finished, Utc::now()));
        }

        if state.queue.is_empty() {
            info!("queue empty, playback stopped ({:?})", reason);
            self.broadcaster.send(ServerEvent::StopVideo);
            return false;
        }

        let next = state.queue.remove(0);
        info!("now playing entry {} ({:?})", next.id, reason);
        self.store.delete(next.id);
        state.current = Some(next.clone());
        self.broadcaster
            .send(ServerEvent::QueueUpdate(state.queue.clone()));
        self.broadcaster.send(ServerEvent::PlayVideo(next));
        true
    }

    /// Cancel any pending auto-advance timer.
    fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().expect("timer lock").take() {
            handle.abort();
        }
    }

    /// Arm the fixed-duration "assume finished" timer for the item that
    /// just started. A manual advance arriving earlier cancels it; the
    /// epoch check makes the fire path a no-op even if the abort loses
    /// the race.
    fn schedule_timer(shared: &Arc<EngineShared>, armed_epoch: u64) {
        if shared.auto_advance_secs == 0 {
            return;
        }

        let engine = Arc::clone(shared);
        let secs = shared.auto_advance_secs;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;

            let mut state = engine.inner.lock().await;
            if state.epoch != armed_epoch {
                return;
            }
            debug!("auto-advance timer elapsed after {}s", secs);
            let started = engine.apply_advance(&mut state, AdvanceReason::Timer);
            let epoch = state.epoch;
            drop(state);

            if started {
                EngineShared::schedule_timer(&engine, epoch);
            }
        })
        .abort_handle();

        *shared.timer.lock().expect("timer lock") = Some(handle);
    }
}
