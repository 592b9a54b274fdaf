//! UseCase: プレゼンス通知
//!
//! 認証済みセッションを Connection Registry に登録します。
//! 同じユーザーの既存セッションは上書きされますが、古いトランスポートは閉じません。

use std::sync::Arc;

use crate::{
    domain::UserId,
    infrastructure::session::{ConnectionRegistry, SessionHandle},
};

use super::error::PresenceError;

/// プレゼンス通知のユースケース
pub struct AnnouncePresenceUseCase {
    registry: Arc<ConnectionRegistry>,
}

impl AnnouncePresenceUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// プレゼンス通知を実行
    ///
    /// # Arguments
    ///
    /// * `session` - 通知元のセッション
    /// * `claimed` - クライアントが名乗るユーザー ID（認証済み ID と一致する必要がある）
    ///
    /// # Returns
    ///
    /// * `Ok(Some(handle))` - 上書きされた以前のセッション
    /// * `Ok(None)` - 新規登録
    /// * `Err(PresenceError)` - ID 不一致
    pub async fn execute(
        &self,
        session: &SessionHandle,
        claimed: UserId,
    ) -> Result<Option<SessionHandle>, PresenceError> {
        if &claimed != session.user_id() {
            return Err(PresenceError::IdentityMismatch {
                authenticated: session.user_id().clone(),
                claimed,
            });
        }

        let displaced = self
            .registry
            .register(session.clone())
            .await
            .filter(|previous| previous.id() != session.id());

        if let Some(previous) = &displaced {
            tracing::info!(
                user_id = %session.user_id(),
                previous_session = %previous.id(),
                session_id = %session.id(),
                "presence moved to a newer session"
            );
        }

        Ok(displaced)
    }
}
