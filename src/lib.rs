//! # vidsync
//!
//! Shared video queue synchronizer: multiple clients submit video
//! references to one ordered queue, a designated client renders the
//! current item, and every state change fans out to all connected
//! sessions in real time.
//!
//! - Queue engine: authoritative FIFO state machine ([`engine`])
//! - Fan-out: tokio broadcast of full-state events ([`broadcast`])
//! - Persistence: write-through SQLite mirror ([`db`])
//! - Session gateway: WebSocket join replay + command dispatch
//!   ([`gateway`])

pub mod api;
pub mod broadcast;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod events;
pub mod gateway;
pub mod media;
pub mod resolver;

pub use error::{Error, Result};
