//! Infrastructure layer: token verification, in-memory session state,
//! store implementations and wire DTOs.

pub mod auth;
pub mod dto;
pub mod repository;
pub mod session;
