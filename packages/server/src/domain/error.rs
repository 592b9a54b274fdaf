//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::{RoomId, SessionId};

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    #[error("UserId cannot exceed {max} bytes (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    #[error("RoomId cannot exceed {max} bytes (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("MessageBody cannot be empty")]
    MessageBodyEmpty,

    #[error("MessageBody cannot exceed {max} bytes (got {actual})")]
    MessageBodyTooLong { max: usize, actual: usize },
}

/// Session token verification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed: {0}")]
    Malformed(String),

    /// The `sub` claim does not form a valid user id
    #[error("token subject is invalid: {0}")]
    InvalidSubject(#[from] ValueObjectError),
}

/// Errors reported by the storage collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requester does not belong to the target room
    #[error("user is not a member of room '{0}'")]
    NotAMember(RoomId),

    /// The backend could not be reached or the statement failed
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A registered session handle no longer reaches a live transport.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("session '{0}' is no longer connected")]
pub struct StaleSessionError(pub SessionId);
