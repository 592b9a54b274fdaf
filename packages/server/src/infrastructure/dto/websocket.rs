//! WebSocket event DTOs for the relay.

use serde::{Deserialize, Serialize};

use crate::domain::{NotificationPayload, StoredMessage};

/// Events accepted from an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    AnnouncePresence { user_id: String },
    JoinRoom { room_id: String },
    LeaveRoom { room_id: String },
    SendMessage { room_id: String, body: String },
}

/// Events emitted to sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    MessageDelivered { message: MessageDto },
    Notification { notification: NotificationDto },
    Error { code: ErrorCode, message: String },
    PresenceAnnounced { user_id: String },
    RoomJoined { room_id: String },
    RoomLeft { room_id: String },
}

impl ServerEvent {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            code,
            message: message.into(),
        }
    }

    pub fn message_delivered(message: &StoredMessage) -> Self {
        ServerEvent::MessageDelivered {
            message: MessageDto::from(message),
        }
    }

    pub fn notification(payload: &NotificationPayload) -> Self {
        ServerEvent::Notification {
            notification: NotificationDto::from(payload),
        }
    }
}

/// Machine-readable error codes carried by `error` events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidPayload,
    InvalidRoomId,
    InvalidMessage,
    IdentityMismatch,
    NotAMember,
    StorageUnavailable,
}

/// Stored message as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub body: String,
    /// Unix timestamp (milliseconds since epoch) in UTC
    pub timestamp: i64,
}

impl From<&StoredMessage> for MessageDto {
    fn from(message: &StoredMessage) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            room_id: message.room_id.as_str().to_string(),
            sender_id: message.sender_id.as_str().to_string(),
            body: message.body.as_str().to_string(),
            timestamp: message.timestamp.value(),
        }
    }
}

/// Side-channel notification as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDto {
    pub sender_id: String,
    pub sender_name: String,
    pub preview: String,
    pub reference_id: String,
    pub room_id: String,
    pub timestamp: i64,
}

impl From<&NotificationPayload> for NotificationDto {
    fn from(payload: &NotificationPayload) -> Self {
        Self {
            sender_id: payload.sender_id.as_str().to_string(),
            sender_name: payload.sender_name.clone(),
            preview: payload.preview.clone(),
            reference_id: payload.reference_id.as_str().to_string(),
            room_id: payload.room_id.as_str().to_string(),
            timestamp: payload.timestamp.value(),
        }
    }
}
