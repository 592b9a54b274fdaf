//! Shared utilities for the LearnLink realtime relay.
//!
//! Logger setup and time helpers used by the server binary and its tests.

pub mod logger;
pub mod time;
