//! InMemory Store 実装
//!
//! ドメイン層が定義する MessageStore / UserDirectory / NotificationStore trait の
//! インメモリ実装。テストとローカル動作確認用で、プロセス終了とともに内容は失われます。

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    MessageBody, MessageId, MessageStore, NotificationPayload, NotificationStore, RoomId,
    RoomKind, StoreError, StoredMessage, Timestamp, UserDirectory, UserId,
};

#[derive(Debug, Clone)]
struct Conversation {
    kind: RoomKind,
    members: BTreeSet<UserId>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, String>,
    conversations: HashMap<RoomId, Conversation>,
    messages: Vec<StoredMessage>,
    notifications: Vec<NotificationPayload>,
}

impl Inner {
    /// 要求者が所属する会話を取得（所属していなければ NotAMember）
    fn conversation_for(
        &self,
        room_id: &RoomId,
        requester_id: &UserId,
    ) -> Result<&Conversation, StoreError> {
        self.conversations
            .get(room_id)
            .filter(|c| c.members.contains(requester_id))
            .ok_or_else(|| StoreError::NotAMember(room_id.clone()))
    }
}

/// インメモリ Store 実装
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザーを登録（表示名つき）
    pub fn with_user(mut self, user_id: UserId, display_name: impl Into<String>) -> Self {
        self.inner
            .get_mut()
            .users
            .insert(user_id, display_name.into());
        self
    }

    /// 1 対 1 の会話を登録
    pub fn with_direct_room(mut self, room_id: RoomId, a: UserId, b: UserId) -> Self {
        self.inner.get_mut().conversations.insert(
            room_id,
            Conversation {
                kind: RoomKind::Direct,
                members: BTreeSet::from([a, b]),
            },
        );
        self
    }

    /// グループチャットルームを登録
    pub fn with_group_room(
        mut self,
        room_id: RoomId,
        members: impl IntoIterator<Item = UserId>,
    ) -> Self {
        self.inner.get_mut().conversations.insert(
            room_id,
            Conversation {
                kind: RoomKind::Group,
                members: members.into_iter().collect(),
            },
        );
        self
    }

    /// ルームに保存されたメッセージ（保存順）
    pub async fn messages_in(&self, room_id: &RoomId) -> Vec<StoredMessage> {
        let inner = self.inner.lock().await;
        inner
            .messages
            .iter()
            .filter(|m| &m.room_id == room_id)
            .cloned()
            .collect()
    }

    /// 受信者宛てに保存された通知（保存順）
    pub async fn notifications_for(&self, recipient_id: &UserId) -> Vec<NotificationPayload> {
        let inner = self.inner.lock().await;
        inner
            .notifications
            .iter()
            .filter(|n| &n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn resolve_other_participant(
        &self,
        room_id: &RoomId,
        requester_id: &UserId,
    ) -> Result<Option<UserId>, StoreError> {
        let inner = self.inner.lock().await;
        let conversation = inner.conversation_for(room_id, requester_id)?;
        match conversation.kind {
            RoomKind::Direct => Ok(conversation
                .members
                .iter()
                .find(|member| *member != requester_id)
                .cloned()),
            RoomKind::Group => Ok(None),
        }
    }

    async fn persist(
        &self,
        room_id: &RoomId,
        sender_id: &UserId,
        body: &MessageBody,
    ) -> Result<StoredMessage, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.conversation_for(room_id, sender_id)?;

        let message = StoredMessage::new(
            MessageId::generate(),
            room_id.clone(),
            sender_id.clone(),
            body.clone(),
            Timestamp::now(),
        );
        inner.messages.push(message.clone());
        Ok(message)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(user_id).cloned())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn write_notification(&self, payload: &NotificationPayload) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.notifications.push(payload.clone());
        Ok(())
    }
}
