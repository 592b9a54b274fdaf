//! UseCase: セッション切断
//!
//! 切断されたセッションを全ルームとレジストリから一度に取り除きます。
//! 呼び出し元への通知は行いません。

use std::sync::Arc;

use crate::{
    domain::{RoomId, SessionId, UserId},
    infrastructure::session::{ConnectionRegistry, RoomMembershipIndex},
};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// 退出したルーム
    pub left_rooms: Vec<RoomId>,
    /// レジストリから削除されたユーザー（上書き済みなら `None`）
    pub unregistered: Option<UserId>,
}

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomMembershipIndex>,
}

impl DisconnectSessionUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, rooms: Arc<RoomMembershipIndex>) -> Self {
        Self { registry, rooms }
    }

    pub async fn execute(&self, session_id: SessionId) -> DisconnectOutcome {
        let left_rooms = self.rooms.remove_session(&session_id).await;
        let unregistered = self.registry.unregister(&session_id).await;

        tracing::info!(
            session_id = %session_id,
            rooms = left_rooms.len(),
            unregistered = unregistered.is_some(),
            "session cleaned up"
        );

        DisconnectOutcome {
            left_rooms,
            unregistered,
        }
    }
}
