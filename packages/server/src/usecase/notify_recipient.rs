//! UseCase: 通知サイドチャネル
//!
//! リレー成功後、受信者の登録済みセッションにだけ軽量な通知を送ります。
//! ライブセッションがなければ、通知ストアへの記録にフォールバックします。

use std::sync::Arc;

use crate::{
    domain::{NotificationPayload, NotificationStore, SessionId, StoredMessage, UserDirectory, UserId},
    infrastructure::{dto::websocket::ServerEvent, session::ConnectionRegistry},
};

/// 通知の配送結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDelivery {
    /// ライブセッションに送信した
    Delivered(SessionId),
    /// ライブセッションがなく、通知ストアに記録した
    Deferred,
    /// ライブセッションがなく、通知ストアへの記録にも失敗した
    Dropped,
}

/// 通知サイドチャネルのユースケース
pub struct NotifyRecipientUseCase {
    registry: Arc<ConnectionRegistry>,
    directory: Arc<dyn UserDirectory>,
    notification_store: Arc<dyn NotificationStore>,
}

impl NotifyRecipientUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        directory: Arc<dyn UserDirectory>,
        notification_store: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            registry,
            directory,
            notification_store,
        }
    }

    /// 受信者に通知を送る（エラーは返さない）
    ///
    /// # Arguments
    ///
    /// * `recipient` - 通知先のユーザー
    /// * `message` - 保存済みのメッセージ
    /// * `sender_hint` - 送信者セッションの表示名（ディレクトリに名前がない場合に使う）
    pub async fn execute(
        &self,
        recipient: &UserId,
        message: &StoredMessage,
        sender_hint: Option<&str>,
    ) -> NotificationDelivery {
        let sender_name = self.sender_name(&message.sender_id, sender_hint).await;
        let payload = NotificationPayload::for_message(recipient.clone(), sender_name, message);

        if let Some(handle) = self.registry.lookup(recipient).await {
            match handle.emit(ServerEvent::notification(&payload)) {
                Ok(()) => {
                    tracing::debug!(recipient = %recipient, session_id = %handle.id(), "notification delivered");
                    return NotificationDelivery::Delivered(handle.id());
                }
                Err(stale) => {
                    tracing::debug!(recipient = %recipient, "{stale}");
                    self.registry.unregister(&stale.0).await;
                }
            }
        }

        match self.notification_store.write_notification(&payload).await {
            Ok(()) => {
                tracing::debug!(recipient = %recipient, "recipient offline, notification stored");
                NotificationDelivery::Deferred
            }
            Err(e) => {
                tracing::warn!(recipient = %recipient, error = %e, "notification dropped");
                NotificationDelivery::Dropped
            }
        }
    }

    /// 送信者の表示名（ディレクトリ → セッションの表示名 → ユーザー ID の順）
    async fn sender_name(&self, sender_id: &UserId, sender_hint: Option<&str>) -> String {
        let found = match self.directory.display_name(sender_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(sender_id = %sender_id, error = %e, "display name lookup failed");
                None
            }
        };
        found
            .or_else(|| sender_hint.map(str::to_string))
            .unwrap_or_else(|| sender_id.to_string())
    }
}
