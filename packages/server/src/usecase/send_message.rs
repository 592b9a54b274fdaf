//! UseCase: メッセージリレー
//!
//! 1. 1 対 1 の会話なら相手を解決する
//! 2. メッセージを保存する（失敗したら中断し、ブロードキャストしない）
//! 3. ルームの参加セッション（スナップショット）へ配送する
//! 4. ルーム外にいる相手のセッションへ直接配送する
//! 5. 相手に通知サイドチャネルを送る

use std::sync::Arc;

use crate::{
    domain::{MessageBody, MessageStore, RoomId, SessionId, StoredMessage, UserId},
    infrastructure::{
        dto::websocket::ServerEvent,
        session::{ConnectionRegistry, RoomMembershipIndex, SessionHandle},
    },
};

use super::{
    error::SendMessageError,
    notify_recipient::{NotificationDelivery, NotifyRecipientUseCase},
};

/// リレー結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// 保存されたメッセージ
    pub message: StoredMessage,
    /// `message_delivered` を受け取ったセッション
    pub delivered_to: Vec<SessionId>,
    /// 1 対 1 の会話の相手（グループでは `None`）
    pub recipient: Option<UserId>,
    /// 相手への通知結果（グループでは `None`）
    pub notification: Option<NotificationDelivery>,
}

/// メッセージリレーのユースケース
pub struct SendMessageUseCase {
    message_store: Arc<dyn MessageStore>,
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomMembershipIndex>,
    notifier: NotifyRecipientUseCase,
}

impl SendMessageUseCase {
    pub fn new(
        message_store: Arc<dyn MessageStore>,
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomMembershipIndex>,
        notifier: NotifyRecipientUseCase,
    ) -> Self {
        Self {
            message_store,
            registry,
            rooms,
            notifier,
        }
    }

    /// メッセージリレーを実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者のセッション
    /// * `room_id` - 宛先のルーム
    /// * `body` - メッセージ本文
    ///
    /// # Returns
    ///
    /// * `Ok(RelayOutcome)` - 保存と配送の結果
    /// * `Err(SendMessageError)` - 保存前の失敗。誰にも配送されていない
    pub async fn execute(
        &self,
        sender: &SessionHandle,
        room_id: RoomId,
        body: MessageBody,
    ) -> Result<RelayOutcome, SendMessageError> {
        let sender_id = sender.user_id();

        let recipient = self
            .message_store
            .resolve_other_participant(&room_id, sender_id)
            .await?;
        let message = self.message_store.persist(&room_id, sender_id, &body).await?;

        tracing::info!(
            room_id = %room_id,
            sender_id = %sender_id,
            message_id = %message.id,
            "message stored"
        );

        let event = ServerEvent::message_delivered(&message);
        let members = self.rooms.members_of(&room_id).await;
        let mut delivered_to = Vec::with_capacity(members.len() + 1);

        for member in &members {
            if self.deliver(member, &event).await {
                delivered_to.push(member.id());
            }
        }

        if let Some(recipient_id) = &recipient
            && let Some(handle) = self.registry.lookup(recipient_id).await
            && !members.iter().any(|m| m.id() == handle.id())
            && self.deliver(&handle, &event).await
        {
            delivered_to.push(handle.id());
        }

        let notification = match &recipient {
            Some(recipient_id) => Some(
                self.notifier
                    .execute(recipient_id, &message, sender.display_name())
                    .await,
            ),
            None => None,
        };

        Ok(RelayOutcome {
            message,
            delivered_to,
            recipient,
            notification,
        })
    }

    /// 1 セッションへ配送する。切断済みならレジストリとインデックスから取り除く
    async fn deliver(&self, handle: &SessionHandle, event: &ServerEvent) -> bool {
        match handle.emit(event.clone()) {
            Ok(()) => true,
            Err(stale) => {
                tracing::debug!(user_id = %handle.user_id(), "{stale}");
                self.registry.unregister(&stale.0).await;
                self.rooms.remove_session(&stale.0).await;
                false
            }
        }
    }
}
