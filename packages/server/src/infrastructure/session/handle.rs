//! Transport session handle.

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    domain::{SessionId, StaleSessionError, UserId},
    infrastructure::dto::websocket::ServerEvent,
};

/// Handle to one authenticated WebSocket connection.
///
/// Cloning shares the underlying channel. The user identity is fixed when the
/// handle is created and cannot change afterwards.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    user_id: UserId,
    /// `name` claim of the session token, if present
    display_name: Option<String>,
    sender: UnboundedSender<ServerEvent>,
}

impl SessionHandle {
    /// Create a handle for a freshly authenticated connection.
    pub fn new(user_id: UserId, sender: UnboundedSender<ServerEvent>) -> Self {
        Self {
            id: SessionId::generate(),
            user_id,
            display_name: None,
            sender,
        }
    }

    /// Attach the display name carried by the session token.
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Queue an event for this session's writer task.
    ///
    /// # Errors
    ///
    /// Returns `StaleSessionError` once the writer side has gone away.
    pub fn emit(&self, event: ServerEvent) -> Result<(), StaleSessionError> {
        self.sender.send(event).map_err(|_| StaleSessionError(self.id))
    }

    /// Whether the transport behind this handle has closed.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dto::websocket::ErrorCode;
    use tokio::sync::mpsc;

    #[test]
    fn test_emit_to_live_session() {
        // テスト項目: 接続中のセッションにイベントを送信できる
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = SessionHandle::new(UserId::new("1".to_string()).unwrap(), tx);

        // when (操作):
        let result = handle.emit(ServerEvent::error(ErrorCode::InvalidPayload, "bad"));

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(matches!(rx.try_recv(), Ok(ServerEvent::Error { .. })));
    }

    #[test]
    fn test_emit_to_closed_session_is_stale() {
        // テスト項目: 受信側が破棄されたセッションへの送信は StaleSessionError になる
        // given (前提条件):
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = SessionHandle::new(UserId::new("1".to_string()).unwrap(), tx);
        drop(rx);

        // when (操作):
        let result = handle.emit(ServerEvent::RoomJoined {
            room_id: "dm-12".to_string(),
        });

        // then (期待する結果):
        assert_eq!(result, Err(StaleSessionError(handle.id())));
        assert!(handle.is_closed());
    }

    #[test]
    fn test_display_name_from_token() {
        // テスト項目: トークンの表示名をハンドルに保持できる
        // given (前提条件):
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let handle = SessionHandle::new(UserId::new("1".to_string()).unwrap(), tx)
            .with_display_name(Some("A".to_string()));

        // then (期待する結果):
        assert_eq!(handle.display_name(), Some("A"));
    }
}
