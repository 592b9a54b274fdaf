//! In-memory session state: transport handles, the connection registry and
//! the room membership index.
//!
//! All of it is per-process and rebuilt from scratch on restart; clients
//! re-announce presence and re-join rooms after reconnecting.

pub mod connection_registry;
pub mod handle;
pub mod room_index;

pub use connection_registry::ConnectionRegistry;
pub use handle::SessionHandle;
pub use room_index::{RoomMembershipIndex, RoomSummary};
