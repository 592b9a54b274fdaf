//! Server state shared by every handler.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    domain::{MessageStore, NotificationStore, TokenVerifier, UserDirectory},
    infrastructure::session::{ConnectionRegistry, RoomMembershipIndex},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// Session token, for clients that cannot set an `Authorization` header
    pub token: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// ハンドシェイク時のトークン検証
    pub verifier: Arc<dyn TokenVerifier>,
    /// メッセージの保存先（system of record）
    pub message_store: Arc<dyn MessageStore>,
    pub directory: Arc<dyn UserDirectory>,
    /// ライブセッションがない場合の通知記録先
    pub notification_store: Arc<dyn NotificationStore>,
    /// ユーザー ID → セッション
    pub registry: Arc<ConnectionRegistry>,
    /// ルーム ID → 参加セッション
    pub rooms: Arc<RoomMembershipIndex>,
}

impl AppState {
    /// Build state around a single store that implements every collaborator.
    pub fn new<S>(verifier: Arc<dyn TokenVerifier>, store: Arc<S>) -> Self
    where
        S: MessageStore + UserDirectory + NotificationStore + 'static,
    {
        Self {
            verifier,
            message_store: store.clone(),
            directory: store.clone(),
            notification_store: store,
            registry: Arc::new(ConnectionRegistry::new()),
            rooms: Arc::new(RoomMembershipIndex::new()),
        }
    }
}
