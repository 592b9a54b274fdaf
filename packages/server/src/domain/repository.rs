//! Collaborator interfaces the relay depends on.
//!
//! The domain defines these traits; concrete implementations live in the
//! infrastructure layer (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::{NotificationPayload, StoredMessage, VerifiedToken},
    error::{AuthError, StoreError},
    value_object::{MessageBody, RoomId, UserId},
};

/// Verifies signed session tokens presented at handshake time.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// Check signature and expiry, returning the decoded identity.
    fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError>;
}

/// System of record for chat messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Resolve the other participant of a direct conversation.
    ///
    /// Returns `Ok(None)` for group chatrooms, and `StoreError::NotAMember`
    /// when the requester does not belong to the room.
    async fn resolve_other_participant(
        &self,
        room_id: &RoomId,
        requester_id: &UserId,
    ) -> Result<Option<UserId>, StoreError>;

    /// Persist a message and return the stored record.
    async fn persist(
        &self,
        room_id: &RoomId,
        sender_id: &UserId,
        body: &MessageBody,
    ) -> Result<StoredMessage, StoreError>;
}

/// Read access to user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>, StoreError>;
}

/// Durable notification records, used when no live session is registered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn write_notification(&self, payload: &NotificationPayload) -> Result<(), StoreError>;
}
