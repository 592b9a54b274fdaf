//! Room Membership Index
//!
//! ルーム ID ごとに参加中のセッションを保持するインデックス。
//! ルームは最初の join で暗黙的に作成され、最後のメンバーが抜けると削除されます。

use std::collections::{BTreeSet, HashMap};

use tokio::sync::Mutex;

use crate::domain::{RoomId, SessionId, UserId};

use super::SessionHandle;

/// ルームごとの参加人数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub member_count: usize,
}

#[derive(Debug, Default)]
struct Inner {
    /// ルーム ID → (セッション ID → ハンドル)
    rooms: HashMap<RoomId, HashMap<SessionId, SessionHandle>>,
    /// セッション ID → 参加中のルーム（切断時のクリーンアップ用）
    joined: HashMap<SessionId, BTreeSet<RoomId>>,
}

impl Inner {
    fn detach(&mut self, session_id: &SessionId, room_id: &RoomId) -> bool {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let removed = members.remove(session_id).is_some();
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        removed
    }
}

/// ルーム参加状況のインデックス
///
/// 容量制限や退避はなく、明示的な leave か切断でのみ縮小する。
#[derive(Debug, Default)]
pub struct RoomMembershipIndex {
    inner: Mutex<Inner>,
}

impl RoomMembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// セッションをルームに追加
    ///
    /// # Returns
    ///
    /// 新規に参加した場合は `true`、既に参加済みなら `false`
    pub async fn join(&self, handle: &SessionHandle, room_id: &RoomId) -> bool {
        let mut inner = self.inner.lock().await;
        let newly_joined = inner
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(handle.id(), handle.clone())
            .is_none();
        inner
            .joined
            .entry(handle.id())
            .or_default()
            .insert(room_id.clone());
        newly_joined
    }

    /// セッションをルームから削除
    ///
    /// # Returns
    ///
    /// 参加していた場合は `true`
    pub async fn leave(&self, session_id: &SessionId, room_id: &RoomId) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = inner.detach(session_id, room_id);
        if let Some(rooms) = inner.joined.get_mut(session_id) {
            rooms.remove(room_id);
            if rooms.is_empty() {
                inner.joined.remove(session_id);
            }
        }
        removed
    }

    /// ルームに参加中のセッション一覧（スナップショット）
    ///
    /// 返却後にメンバーが変わっても結果には影響しない。
    pub async fn members_of(&self, room_id: &RoomId) -> Vec<SessionHandle> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// ルームに参加中のユーザー ID（重複なし・ソート済み）
    pub async fn member_users(&self, room_id: &RoomId) -> Vec<UserId> {
        let inner = self.inner.lock().await;
        let users: BTreeSet<UserId> = inner
            .rooms
            .get(room_id)
            .map(|members| members.values().map(|h| h.user_id().clone()).collect())
            .unwrap_or_default();
        users.into_iter().collect()
    }

    /// セッションが参加中のルーム一覧
    pub async fn rooms_of(&self, session_id: &SessionId) -> Vec<RoomId> {
        let inner = self.inner.lock().await;
        inner
            .joined
            .get(session_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// セッションを全ルームから削除（切断時）
    ///
    /// # Returns
    ///
    /// 削除されたルームの一覧
    pub async fn remove_session(&self, session_id: &SessionId) -> Vec<RoomId> {
        let mut inner = self.inner.lock().await;
        let rooms: Vec<RoomId> = inner
            .joined
            .remove(session_id)
            .map(|rooms| rooms.into_iter().collect())
            .unwrap_or_default();
        for room_id in &rooms {
            inner.detach(session_id, room_id);
        }
        rooms
    }

    /// 全ルームの参加人数（ルーム ID 順）
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let inner = self.inner.lock().await;
        let mut summaries: Vec<RoomSummary> = inner
            .rooms
            .iter()
            .map(|(room_id, members)| RoomSummary {
                room_id: room_id.clone(),
                member_count: members.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }
}
