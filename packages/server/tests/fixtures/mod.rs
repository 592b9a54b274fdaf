//! Shared helpers for integration tests.
//!
//! Each test starts its own server on an ephemeral port, backed by a seeded
//! in-memory store, and talks to it over HTTP and WebSocket.
#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use learnlink_server::{
    domain::{RoomId, UserId},
    infrastructure::{auth::JwtTokenVerifier, repository::InMemoryStore},
    ui::{build_router, state::AppState},
};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn room(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

/// Users 1 (A), 2 (B), 3 (C); direct room dm-12; group room group-7
fn seeded_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_user(user("1"), "A")
        .with_user(user("2"), "B")
        .with_user(user("3"), "C")
        .with_direct_room(room("dm-12"), user("1"), user("2"))
        .with_group_room(room("group-7"), [user("1"), user("2"), user("3")])
}

pub struct TestServer {
    addr: SocketAddr,
    pub store: Arc<InMemoryStore>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let store = Arc::new(seeded_store());
        let verifier = Arc::new(JwtTokenVerifier::new(TEST_SECRET));
        let app = build_router(Arc::new(AppState::new(verifier, store.clone())));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            addr,
            store,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn token_for(&self, user_id: &str) -> String {
        JwtTokenVerifier::new(TEST_SECRET)
            .issue(&user(user_id), None, chrono::Duration::minutes(5))
            .expect("Failed to issue token")
    }

    /// Connect with `?token=` and wait for the presence acknowledgement
    pub async fn connect_and_announce(&self, user_id: &str) -> WsStream {
        let url = format!("{}?token={}", self.ws_url(), self.token_for(user_id));
        let (mut ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("Failed to connect");

        send_json(
            &mut ws,
            serde_json::json!({"type": "announce_presence", "user_id": user_id}),
        )
        .await;
        let ack = recv_json(&mut ws).await;
        assert_eq!(ack["type"], "presence_announced");
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn send_json(ws: &mut WsStream, value: serde_json::Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send");
}

/// Next text frame as JSON, failing after two seconds
pub async fn recv_json(ws: &mut WsStream) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).expect("Invalid JSON");
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {e}"),
                None => panic!("WebSocket closed"),
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}

/// Assert no text frame arrives within a short window
pub async fn assert_silent(ws: &mut WsStream) {
    let result = tokio::time::timeout(Duration::from_millis(200), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                _ => std::future::pending::<()>().await,
            }
        }
    })
    .await;
    assert!(result.is_err(), "Unexpected event: {:?}", result);
}

pub async fn join_room(ws: &mut WsStream, room_id: &str) {
    send_json(ws, serde_json::json!({"type": "join_room", "room_id": room_id})).await;
    let ack = recv_json(ws).await;
    assert_eq!(ack["type"], "room_joined");
    assert_eq!(ack["room_id"], room_id);
}
