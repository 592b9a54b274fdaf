//! LearnLink realtime relay library.
//!
//! Authenticated WebSocket sessions announce presence, join conversation
//! rooms and send messages. Messages are persisted before being fanned out
//! to room members, the direct recipient and the notification side channel.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use ui::{ServerConfig, run};
