//! UseCase 層のエラー定義

use thiserror::Error;

use crate::{
    domain::{AuthError, RoomId, StoreError, UserId},
    infrastructure::dto::websocket::ErrorCode,
};

/// ハンドシェイク（接続時認証）のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("no bearer token was presented")]
    MissingToken,

    #[error("token rejected: {0}")]
    Rejected(#[from] AuthError),
}

/// プレゼンス登録のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresenceError {
    /// 認証済み ID と異なる ID でのプレゼンス通知
    #[error("session is authenticated as '{authenticated}', cannot announce '{claimed}'")]
    IdentityMismatch {
        authenticated: UserId,
        claimed: UserId,
    },
}

impl PresenceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PresenceError::IdentityMismatch { .. } => ErrorCode::IdentityMismatch,
        }
    }
}

/// メッセージ送信（リレー）のエラー
///
/// いずれも送信者のセッションにのみ通知され、ブロードキャストは行われない。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("not a member of room '{0}'")]
    NotAMember(RoomId),

    #[error("message could not be stored: {0}")]
    Storage(String),
}

impl SendMessageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SendMessageError::NotAMember(_) => ErrorCode::NotAMember,
            SendMessageError::Storage(_) => ErrorCode::StorageUnavailable,
        }
    }
}

impl From<StoreError> for SendMessageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotAMember(room_id) => SendMessageError::NotAMember(room_id),
            StoreError::Unavailable(reason) => SendMessageError::Storage(reason),
        }
    }
}
