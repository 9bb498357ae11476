//! Ordered store writer
//!
//! The engine updates memory and broadcasts immediately; durability runs
//! behind an unbounded channel drained by a single task, so store writes
//! never sit on the command path but are still applied in the exact order
//! they were issued. Failures are logged and abandoned; the in-memory
//! mutation stands.

use sqlx::{Pool, Sqlite};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::models::{HistoryRecord, QueueEntry};
use super::{history, queue};

/// One durable mutation issued by the engine.
#[derive(Debug)]
pub enum StoreOp {
    SaveEntry(QueueEntry),
    DeleteEntry(i64),
    Archive(HistoryRecord),
    /// Ack once every previously issued op has been applied. Used at
    /// shutdown and by tests.
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task.
#[derive(Clone)]
pub struct StoreWriter {
    tx: mpsc::UnboundedSender<StoreOp>,
}

impl StoreWriter {
    /// Spawn the writer task on the given pool.
    pub fn spawn(pool: Pool<Sqlite>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<StoreOp>();

        tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                match op {
                    StoreOp::SaveEntry(entry) => {
                        if let Err(e) = queue::save(&pool, &entry).await {
                            warn!("store save for entry {} failed: {}", entry.id, e);
                        }
                    }
                    StoreOp::DeleteEntry(id) => {
                        if let Err(e) = queue::delete(&pool, id).await {
                            warn!("store delete for entry {} failed: {}", id, e);
                        }
                    }
                    StoreOp::Archive(record) => {
                        if let Err(e) = history::insert(&pool, &record).await {
                            warn!("history archive for entry {} failed: {}", record.id, e);
                        }
                    }
                    StoreOp::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
            debug!("store writer stopped");
        });

        Self { tx }
    }

    /// Queue a durable save for `entry`.
    pub fn save(&self, entry: QueueEntry) {
        self.push(StoreOp::SaveEntry(entry));
    }

    /// Queue a durable delete for `id`.
    pub fn delete(&self, id: i64) {
        self.push(StoreOp::DeleteEntry(id));
    }

    /// Queue a history archive for `record`.
    pub fn archive(&self, record: HistoryRecord) {
        self.push(StoreOp::Archive(record));
    }

    /// Wait until all previously issued ops have been applied.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.push(StoreOp::Flush(ack_tx));
        let _ = ack_rx.await;
    }

    fn push(&self, op: StoreOp) {
        // Send fails only after the writer task has stopped (shutdown);
        // the op is abandoned like any other failed write.
        if self.tx.send(op).is_err() {
            warn!("store writer unavailable, dropping op");
        }
    }
}
