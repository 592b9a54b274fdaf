//! UseCase: ルーム参加

use std::sync::Arc;

use crate::{
    domain::RoomId,
    infrastructure::session::{RoomMembershipIndex, SessionHandle},
};

/// ルーム参加のユースケース
///
/// 参加資格は送信時に MessageStore が判定するため、ここでは確認しない。
pub struct JoinRoomUseCase {
    rooms: Arc<RoomMembershipIndex>,
}

impl JoinRoomUseCase {
    pub fn new(rooms: Arc<RoomMembershipIndex>) -> Self {
        Self { rooms }
    }

    /// セッションをルームに参加させる
    ///
    /// # Returns
    ///
    /// 新規に参加した場合は `true`
    pub async fn execute(&self, session: &SessionHandle, room_id: &RoomId) -> bool {
        let joined = self.rooms.join(session, room_id).await;
        tracing::info!(
            user_id = %session.user_id(),
            session_id = %session.id(),
            room_id = %room_id,
            newly_joined = joined,
            "joined room"
        );
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_join_room() {
        // テスト項目: セッションがルームのメンバーになる
        // given (前提条件):
        let rooms = Arc::new(RoomMembershipIndex::new());
        let usecase = JoinRoomUseCase::new(rooms.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = SessionHandle::new(UserId::new("1".to_string()).unwrap(), tx);
        let room_id = RoomId::new("dm-12".to_string()).unwrap();

        // when (操作):
        let joined = usecase.execute(&session, &room_id).await;

        // then (期待する結果):
        assert!(joined);
        assert_eq!(rooms.rooms_of(&session.id()).await, vec![room_id]);
    }
}
