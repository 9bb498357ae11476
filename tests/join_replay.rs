//! Join replay tests
//!
//! A late-joining session reconstructs full state from two messages: the
//! queue snapshot and, when something is playing, the current item. The
//! gateway subscribes before reading the snapshot, so the replay plus the
//! event stream covers every state change.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use vidsync::broadcast::Broadcaster;
use vidsync::db::init::initialize_database;
use vidsync::db::writer::StoreWriter;
use vidsync::engine::{AdvanceReason, EngineMode, QueueEngine};
use vidsync::events::{AddVideoRequest, ServerEvent};

async fn create_test_db() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    initialize_database(&pool).await.unwrap();
    pool
}

fn add_request(id: i64, title: &str) -> AddVideoRequest {
    AddVideoRequest {
        id: Some(id),
        url: format!("https://www.youtube.com/watch?v=ref{:08}", id),
        title: Some(title.to_string()),
        duration: None,
    }
}

#[tokio::test]
async fn late_joiner_sees_snapshot_after_mixed_ops() {
    let pool = create_test_db().await;
    let broadcaster = Broadcaster::new(100);
    let store = StoreWriter::spawn(pool.clone());
    let engine = QueueEngine::new(broadcaster.clone(), store, 0);

    for id in 1..=5 {
        engine
            .enqueue(add_request(id, &format!("V{id}")))
            .await
            .unwrap();
    }
    engine.remove(2).await.unwrap();
    engine.remove(4).await.unwrap();

    // The gateway's replay for a session joining now.
    let replay_snapshot = engine.snapshot().await;
    let replay_current = engine.current().await;

    assert_eq!(
        replay_snapshot.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![1, 3, 5]
    );
    assert!(replay_current.is_none());
    assert_eq!(replay_snapshot, engine.snapshot().await);
}

#[tokio::test]
async fn late_joiner_gets_current_item_when_playing() {
    let pool = create_test_db().await;
    let broadcaster = Broadcaster::new(100);
    let store = StoreWriter::spawn(pool.clone());
    let engine = QueueEngine::new(broadcaster.clone(), store, 0);

    engine.enqueue(add_request(1, "A")).await.unwrap();
    engine.enqueue(add_request(2, "B")).await.unwrap();
    engine.advance(AdvanceReason::Manual).await;

    assert_eq!(engine.mode().await, EngineMode::Playing);
    let replay_current = engine.current().await.unwrap();
    assert_eq!(replay_current.id, 1);
    let replay_snapshot = engine.snapshot().await;
    assert_eq!(
        replay_snapshot.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![2]
    );
}

#[tokio::test]
async fn subscriber_then_snapshot_misses_no_update() {
    let pool = create_test_db().await;
    let broadcaster = Broadcaster::new(100);
    let store = StoreWriter::spawn(pool.clone());
    let engine = QueueEngine::new(broadcaster.clone(), store, 0);

    engine.enqueue(add_request(1, "A")).await.unwrap();

    // Join: subscribe first, then read the snapshot.
    let mut rx = broadcaster.subscribe();
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.len(), 1);

    // A mutation racing with the join lands in the subscription.
    engine.enqueue(add_request(2, "B")).await.unwrap();

    match rx.recv().await.unwrap() {
        ServerEvent::QueueUpdate(queue) => {
            assert_eq!(queue.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        }
        other => panic!("expected queue_update, got {other:?}"),
    }
}
