//! Persistent store
//!
//! SQLite-backed durable mirror of the queue and the play history. The
//! store is written through by the queue engine on every mutation and
//! never read-modified by any other component.

pub mod history;
pub mod init;
pub mod models;
pub mod queue;
pub mod writer;
