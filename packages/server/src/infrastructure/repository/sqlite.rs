//! SQLite Store 実装
//!
//! 会話・メンバー・メッセージ・通知を SQLite に保存する永続化層。
//! `rusqlite::Connection` は同期 API のため、全ての操作を
//! `spawn_blocking` 上で Mutex 越しに実行します。

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{
    MessageBody, MessageId, MessageStore, NotificationPayload, NotificationStore, RoomId,
    RoomKind, StoreError, StoredMessage, Timestamp, UserDirectory, UserId,
};

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id           TEXT PRIMARY KEY,
        display_name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS conversations (
        id   TEXT PRIMARY KEY,
        kind TEXT NOT NULL CHECK (kind IN ('direct', 'group'))
    );

    CREATE TABLE IF NOT EXISTS conversation_members (
        conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
        user_id         TEXT NOT NULL,
        PRIMARY KEY (conversation_id, user_id)
    );

    CREATE TABLE IF NOT EXISTS messages (
        id              TEXT PRIMARY KEY,
        conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
        sender_id       TEXT NOT NULL,
        body            TEXT NOT NULL,
        created_at      INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_messages_conversation_ts
        ON messages(conversation_id, created_at);

    CREATE TABLE IF NOT EXISTS notifications (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        recipient_id TEXT NOT NULL,
        sender_id    TEXT NOT NULL,
        sender_name  TEXT NOT NULL,
        preview      TEXT NOT NULL,
        reference_id TEXT NOT NULL,
        room_id      TEXT NOT NULL,
        created_at   INTEGER NOT NULL,
        is_read      INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_notifications_recipient
        ON notifications(recipient_id, created_at);
";

/// SQLite Store 実装
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path. `:memory:` is accepted.
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database (for testing).
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("DB lock error: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("DB task failed: {e}")))?
    }

    /// Insert or rename a user.
    pub async fn upsert_user(&self, user_id: &UserId, display_name: &str) -> Result<(), StoreError> {
        let user_id = user_id.as_str().to_string();
        let display_name = display_name.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (id, display_name) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name",
                params![user_id, display_name],
            )?;
            Ok(())
        })
        .await
    }

    /// Create a conversation with its member list, replacing any previous one.
    pub async fn create_conversation(
        &self,
        room_id: &RoomId,
        kind: RoomKind,
        members: &[UserId],
    ) -> Result<(), StoreError> {
        let room_id = room_id.as_str().to_string();
        let members: Vec<String> = members.iter().map(|m| m.as_str().to_string()).collect();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM conversations WHERE id = ?1", params![room_id])?;
            tx.execute(
                "INSERT INTO conversations (id, kind) VALUES (?1, ?2)",
                params![room_id, kind.as_str()],
            )?;
            for member in &members {
                tx.execute(
                    "INSERT OR IGNORE INTO conversation_members (conversation_id, user_id)
                     VALUES (?1, ?2)",
                    params![room_id, member],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Messages of a conversation, oldest first.
    pub async fn messages_in(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, StoreError> {
        let room = room_id.as_str().to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, body, created_at
                 FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![room], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?;
            let mut messages = Vec::new();
            for row in rows {
                let (id, room_id, sender_id, body, created_at) = row?;
                messages.push(StoredMessage::new(
                    MessageId::new(id),
                    RoomId::new(room_id).map_err(corrupt_row)?,
                    UserId::new(sender_id).map_err(corrupt_row)?,
                    MessageBody::new(body).map_err(corrupt_row)?,
                    Timestamp::new(created_at),
                ));
            }
            Ok(messages)
        })
        .await
    }

    /// Stored notifications for a recipient, oldest first.
    pub async fn notifications_for(
        &self,
        recipient_id: &UserId,
    ) -> Result<Vec<NotificationPayload>, StoreError> {
        let recipient = recipient_id.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT sender_id, sender_name, preview, reference_id, room_id, created_at
                 FROM notifications
                 WHERE recipient_id = ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![recipient.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?;
            let mut notifications = Vec::new();
            for row in rows {
                let (sender_id, sender_name, preview, reference_id, room_id, created_at) = row?;
                notifications.push(NotificationPayload {
                    recipient_id: recipient.clone(),
                    sender_id: UserId::new(sender_id).map_err(corrupt_row)?,
                    sender_name,
                    preview,
                    reference_id: MessageId::new(reference_id),
                    room_id: RoomId::new(room_id).map_err(corrupt_row)?,
                    timestamp: Timestamp::new(created_at),
                });
            }
            Ok(notifications)
        })
        .await
    }
}

fn corrupt_row(err: crate::domain::ValueObjectError) -> StoreError {
    StoreError::Unavailable(format!("corrupt row: {err}"))
}

/// Kind of the conversation if `user_id` is a member of it.
fn membership_kind(
    conn: &Connection,
    room_id: &str,
    user_id: &str,
) -> Result<Option<RoomKind>, StoreError> {
    let kind: Option<String> = conn
        .query_row(
            "SELECT c.kind
             FROM conversations c
             JOIN conversation_members m ON m.conversation_id = c.id
             WHERE c.id = ?1 AND m.user_id = ?2",
            params![room_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(kind.map(|k| match k.as_str() {
        "direct" => RoomKind::Direct,
        _ => RoomKind::Group,
    }))
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn resolve_other_participant(
        &self,
        room_id: &RoomId,
        requester_id: &UserId,
    ) -> Result<Option<UserId>, StoreError> {
        let room = room_id.clone();
        let requester = requester_id.as_str().to_string();
        self.with_conn(move |conn| {
            match membership_kind(conn, room.as_str(), &requester)? {
                None => Err(StoreError::NotAMember(room)),
                Some(RoomKind::Group) => Ok(None),
                Some(RoomKind::Direct) => {
                    let other: Option<String> = conn
                        .query_row(
                            "SELECT user_id FROM conversation_members
                             WHERE conversation_id = ?1 AND user_id <> ?2
                             LIMIT 1",
                            params![room.as_str(), requester],
                            |row| row.get(0),
                        )
                        .optional()?;
                    other.map(UserId::new).transpose().map_err(corrupt_row)
                }
            }
        })
        .await
    }

    async fn persist(
        &self,
        room_id: &RoomId,
        sender_id: &UserId,
        body: &MessageBody,
    ) -> Result<StoredMessage, StoreError> {
        let message = StoredMessage::new(
            MessageId::generate(),
            room_id.clone(),
            sender_id.clone(),
            body.clone(),
            Timestamp::now(),
        );
        self.with_conn(move |conn| {
            if membership_kind(conn, message.room_id.as_str(), message.sender_id.as_str())?
                .is_none()
            {
                return Err(StoreError::NotAMember(message.room_id));
            }
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender_id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.id.as_str(),
                    message.room_id.as_str(),
                    message.sender_id.as_str(),
                    message.body.as_str(),
                    message.timestamp.value(),
                ],
            )?;
            Ok(message)
        })
        .await
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>, StoreError> {
        let user_id = user_id.as_str().to_string();
        self.with_conn(move |conn| {
            let name: Option<String> = conn
                .query_row(
                    "SELECT display_name FROM users WHERE id = ?1",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(name)
        })
        .await
    }
}

#[async_trait]
impl NotificationStore for SqliteStore {
    async fn write_notification(&self, payload: &NotificationPayload) -> Result<(), StoreError> {
        let payload = payload.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO notifications
                    (recipient_id, sender_id, sender_name, preview, reference_id, room_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    payload.recipient_id.as_str(),
                    payload.sender_id.as_str(),
                    payload.sender_name,
                    payload.preview,
                    payload.reference_id.as_str(),
                    payload.room_id.as_str(),
                    payload.timestamp.value(),
                ],
            )?;
            Ok(())
        })
        .await
    }
}
