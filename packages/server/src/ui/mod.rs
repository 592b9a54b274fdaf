//! WebSocket relay server implementation.

pub mod config;
mod handler;
mod runner;
mod signal;
pub mod state;

pub use config::ServerConfig;
pub use runner::{ServerError, build_router, run};
