//! 初期データ投入
//!
//! JSON で記述したユーザーと会話を SQLite Store に投入します。
//! 同じファイルを何度適用しても結果は変わりません（upsert / 置き換え）。
//!
//! ```json
//! {
//!   "users": [{ "id": "1", "name": "A" }, { "id": "2", "name": "B" }],
//!   "conversations": [{ "id": "dm-12", "kind": "direct", "members": ["1", "2"] }]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{RoomId, RoomKind, StoreError, UserId, ValueObjectError};

use super::SqliteStore;

/// Errors raised while loading or applying seed data
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid id in seed data: {0}")]
    InvalidId(#[from] ValueObjectError),

    #[error("direct conversation '{room_id}' must have exactly 2 members (got {actual})")]
    DirectRoomSize { room_id: String, actual: usize },

    #[error("failed to write seed data: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConversation {
    pub id: String,
    pub kind: RoomKind,
    pub members: Vec<String>,
}

/// Users and conversations to load into the store
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub conversations: Vec<SeedConversation>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a seed file from disk
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// ストアに投入する
    ///
    /// ID の検証を全件終えてから書き込むため、不正なデータでは何も書き込まれない。
    pub async fn apply(&self, store: &SqliteStore) -> Result<(), SeedError> {
        let users = self
            .users
            .iter()
            .map(|u| Ok((UserId::new(u.id.clone())?, u.name.as_str())))
            .collect::<Result<Vec<_>, SeedError>>()?;

        let mut conversations = Vec::with_capacity(self.conversations.len());
        for c in &self.conversations {
            if c.kind == RoomKind::Direct && c.members.len() != 2 {
                return Err(SeedError::DirectRoomSize {
                    room_id: c.id.clone(),
                    actual: c.members.len(),
                });
            }
            let members = c
                .members
                .iter()
                .map(|m| UserId::new(m.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            conversations.push((RoomId::new(c.id.clone())?, c.kind, members));
        }

        for (user_id, name) in &users {
            store.upsert_user(user_id, name).await?;
        }
        for (room_id, kind, members) in &conversations {
            store.create_conversation(room_id, *kind, members).await?;
        }

        tracing::info!(
            users = users.len(),
            conversations = conversations.len(),
            "seed data applied"
        );
        Ok(())
    }
}
