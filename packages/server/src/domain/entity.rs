//! Core domain models for the relay.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageBody, MessageId, RoomId, Timestamp, UserId};

/// Maximum number of characters of a message body carried in a notification
pub const NOTIFICATION_PREVIEW_CHARS: usize = 60;

/// Kind of conversation a room id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// One-to-one conversation between exactly two users
    Direct,
    /// Chatroom with any number of members
    Group,
}

impl RoomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Direct => "direct",
            RoomKind::Group => "group",
        }
    }
}

/// A chat message as recorded by the message store (system of record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub body: MessageBody,
    /// Server-side timestamp assigned at persistence
    pub timestamp: Timestamp,
}

impl StoredMessage {
    pub fn new(
        id: MessageId,
        room_id: RoomId,
        sender_id: UserId,
        body: MessageBody,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            sender_id,
            body,
            timestamp,
        }
    }
}

/// Short-form alert about a message, sent on the side channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub recipient_id: UserId,
    pub sender_id: UserId,
    pub sender_name: String,
    /// Body truncated to [`NOTIFICATION_PREVIEW_CHARS`] characters
    pub preview: String,
    /// Id of the message this notification refers to
    pub reference_id: MessageId,
    pub room_id: RoomId,
    pub timestamp: Timestamp,
}

impl NotificationPayload {
    /// Build the notification for `recipient` about `message`.
    pub fn for_message(recipient: UserId, sender_name: String, message: &StoredMessage) -> Self {
        Self {
            recipient_id: recipient,
            sender_id: message.sender_id.clone(),
            sender_name,
            preview: preview_of(message.body.as_str()),
            reference_id: message.id.clone(),
            room_id: message.room_id.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Truncate on a char boundary, marking the cut with an ellipsis.
fn preview_of(body: &str) -> String {
    let mut chars = body.char_indices();
    match chars.nth(NOTIFICATION_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

/// Identity and expiry decoded from a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: UserId,
    /// Expiry (Unix milliseconds)
    pub expires_at: Timestamp,
    /// Display name claim, when the issuer included one
    pub name: Option<String>,
}
