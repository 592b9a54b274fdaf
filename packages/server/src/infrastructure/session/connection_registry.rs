//! Connection Registry
//!
//! ユーザー ID からアクティブなセッションハンドルへの対応表。
//! 同じユーザーが再接続した場合は後勝ち（last-connected-wins）で上書きされます。

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{SessionId, UserId};

use super::SessionHandle;

/// ユーザー ID → セッションハンドルのレジストリ
///
/// プロセス内のみで保持され、永続化はされません。
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: Mutex<HashMap<UserId, SessionHandle>>,
}

impl ConnectionRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// セッションを登録（同じユーザーの既存エントリは上書き）
    ///
    /// # Returns
    ///
    /// 上書きされた以前のハンドル（存在した場合）
    pub async fn register(&self, handle: SessionHandle) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(handle.user_id().clone(), handle)
    }

    /// ユーザーの現在のセッションを取得
    ///
    /// 切断済み（stale）のハンドルが見つかった場合はその場で削除し `None` を返す。
    pub async fn lookup(&self, user_id: &UserId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        let handle = sessions.get(user_id)?.clone();
        if handle.is_closed() {
            tracing::debug!(user_id = %user_id, session_id = %handle.id(), "pruning stale session");
            sessions.remove(user_id);
            return None;
        }
        Some(handle)
    }

    /// セッション ID を指すエントリを削除
    ///
    /// 切断はセッション単位で通知されるため、キーではなく値で走査する。
    /// 後から別セッションで上書き済みの場合は何も削除しない。
    pub async fn unregister(&self, session_id: &SessionId) -> Option<UserId> {
        let mut sessions = self.sessions.lock().await;
        let user_id = sessions
            .iter()
            .find(|(_, handle)| handle.id() == *session_id)
            .map(|(user_id, _)| user_id.clone())?;
        sessions.remove(&user_id);
        Some(user_id)
    }

    /// 登録中のセッション数
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// 登録中のユーザー ID 一覧（ソート済み）
    pub async fn online_users(&self) -> Vec<UserId> {
        let sessions = self.sessions.lock().await;
        let mut users: Vec<UserId> = sessions.keys().cloned().collect();
        users.sort();
        users
    }
}
