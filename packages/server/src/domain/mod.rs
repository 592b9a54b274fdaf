//! Domain layer for the relay.
//!
//! This module contains business types and collaborator interfaces that are
//! independent of data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{NotificationPayload, RoomKind, StoredMessage, VerifiedToken};
pub use error::{AuthError, StaleSessionError, StoreError, ValueObjectError};
pub use repository::{MessageStore, NotificationStore, TokenVerifier, UserDirectory};
pub use value_object::{MessageBody, MessageId, RoomId, SessionId, Timestamp, UserId};
