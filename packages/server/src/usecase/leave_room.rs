//! UseCase: ルーム退出

use std::sync::Arc;

use crate::{
    domain::RoomId,
    infrastructure::session::{RoomMembershipIndex, SessionHandle},
};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    rooms: Arc<RoomMembershipIndex>,
}

impl LeaveRoomUseCase {
    pub fn new(rooms: Arc<RoomMembershipIndex>) -> Self {
        Self { rooms }
    }

    /// セッションをルームから外す
    ///
    /// # Returns
    ///
    /// 参加していた場合は `true`（未参加のルームからの退出は何もしない）
    pub async fn execute(&self, session: &SessionHandle, room_id: &RoomId) -> bool {
        let left = self.rooms.leave(&session.id(), room_id).await;
        if left {
            tracing::info!(
                user_id = %session.user_id(),
                session_id = %session.id(),
                room_id = %room_id,
                "left room"
            );
        }
        left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::UserId, usecase::JoinRoomUseCase};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_join_then_leave_restores_room() {
        // テスト項目: join → leave でルームのメンバーが元に戻る
        // given (前提条件):
        let rooms = Arc::new(RoomMembershipIndex::new());
        let join = JoinRoomUseCase::new(rooms.clone());
        let leave = LeaveRoomUseCase::new(rooms.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = SessionHandle::new(UserId::new("1".to_string()).unwrap(), tx);
        let room_id = RoomId::new("group-7".to_string()).unwrap();
        join.execute(&session, &room_id).await;

        // when (操作):
        let left = leave.execute(&session, &room_id).await;

        // then (期待する結果):
        assert!(left);
        assert!(rooms.members_of(&room_id).await.is_empty());
        assert!(rooms.summaries().await.is_empty());
    }

    #[tokio::test]
    async fn test_leave_unjoined_room_is_noop() {
        // テスト項目: 未参加のルームからの退出は false を返す
        let rooms = Arc::new(RoomMembershipIndex::new());
        let leave = LeaveRoomUseCase::new(rooms);
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = SessionHandle::new(UserId::new("1".to_string()).unwrap(), tx);

        let left = leave
            .execute(&session, &RoomId::new("dm-12".to_string()).unwrap())
            .await;

        assert!(!left);
    }
}
