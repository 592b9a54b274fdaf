//! WebSocket relay integration tests.
//!
//! Handshake guard, relay scenarios and disconnect cleanup, end to end.

mod fixtures;

use std::time::Duration;

use fixtures::{TestServer, assert_silent, join_room, recv_json, room, send_json, user};
use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::{Error as WsError, client::IntoClientRequest};

async fn online_users(server: &TestServer) -> serde_json::Value {
    reqwest::get(format!("{}/api/presence", server.base_url()))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON")
}

#[tokio::test]
async fn test_connection_without_token_is_rejected() {
    // テスト項目: トークンなしの接続は 401 で拒否され、セッションは作られない
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let result = tokio_tungstenite::connect_async(server.ws_url()).await;

    // then (期待する結果):
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        Err(e) => panic!("expected HTTP 401, got {e}"),
        Ok(_) => panic!("expected HTTP 401, connection was accepted"),
    }
    assert_eq!(online_users(&server).await, serde_json::json!({"online": []}));
}

#[tokio::test]
async fn test_connection_with_forged_token_is_rejected() {
    // テスト項目: 別のシークレットで署名されたトークンは拒否され、オンライン一覧にも載らない
    // given (前提条件):
    let server = TestServer::start().await;
    let forged = learnlink_server::infrastructure::auth::JwtTokenVerifier::new(b"other-secret")
        .issue(&user("1"), None, chrono::Duration::minutes(5))
        .unwrap();

    // when (操作):
    let result =
        tokio_tungstenite::connect_async(format!("{}?token={}", server.ws_url(), forged)).await;

    // then (期待する結果):
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        Err(e) => panic!("expected HTTP 401, got {e}"),
        Ok(_) => panic!("expected HTTP 401, connection was accepted"),
    }
    assert_eq!(online_users(&server).await, serde_json::json!({"online": []}));
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    // テスト項目: Authorization ヘッダーのベアラートークンで接続できる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut request = server.ws_url().into_client_request().unwrap();
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {}", server.token_for("2")).parse().unwrap(),
    );

    // when (操作):
    let (mut ws, _) = tokio_tungstenite::connect_async(request)
        .await
        .expect("Failed to connect");
    send_json(
        &mut ws,
        serde_json::json!({"type": "announce_presence", "user_id": "2"}),
    )
    .await;

    // then (期待する結果):
    let ack = recv_json(&mut ws).await;
    assert_eq!(ack["type"], "presence_announced");
    assert_eq!(ack["user_id"], "2");
}

#[tokio::test]
async fn test_announce_other_identity_is_rejected() {
    // テスト項目: 認証済み ID と異なる ID でのプレゼンス通知はエラーになる
    // given (前提条件):
    let server = TestServer::start().await;
    let url = format!("{}?token={}", server.ws_url(), server.token_for("1"));
    let (mut ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();

    // when (操作):
    send_json(
        &mut ws,
        serde_json::json!({"type": "announce_presence", "user_id": "2"}),
    )
    .await;

    // then (期待する結果):
    let event = recv_json(&mut ws).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["code"], "identity_mismatch");
}

#[tokio::test]
async fn test_direct_message_scenario() {
    // テスト項目: A が dm-12 に "hello" を送ると A と B に同じ ID のメッセージが届き、
    //             B には送信者名 "A" の通知が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_and_announce("1").await;
    let mut bob = server.connect_and_announce("2").await;
    join_room(&mut alice, "dm-12").await;
    join_room(&mut bob, "dm-12").await;

    // when (操作):
    send_json(
        &mut alice,
        serde_json::json!({"type": "send_message", "room_id": "dm-12", "body": "hello"}),
    )
    .await;

    // then (期待する結果):
    let to_alice = recv_json(&mut alice).await;
    let to_bob = recv_json(&mut bob).await;
    assert_eq!(to_alice["type"], "message_delivered");
    assert_eq!(to_bob["type"], "message_delivered");
    assert_eq!(to_alice["message"]["id"], to_bob["message"]["id"]);
    assert_eq!(to_bob["message"]["sender_id"], "1");
    assert_eq!(to_bob["message"]["body"], "hello");

    let notification = recv_json(&mut bob).await;
    assert_eq!(notification["type"], "notification");
    assert_eq!(notification["notification"]["sender_name"], "A");
    assert_eq!(
        notification["notification"]["reference_id"],
        to_bob["message"]["id"]
    );
    assert_silent(&mut alice).await;

    let stored = server.store.messages_in(&room("dm-12")).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender_id, user("1"));
    assert_eq!(stored[0].body.as_str(), "hello");
}

#[tokio::test]
async fn test_non_member_gets_error_only() {
    // テスト項目: C が未所属の dm-99 に送信すると C にだけエラーが届き、配送は起きない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_and_announce("1").await;
    let mut carol = server.connect_and_announce("3").await;
    join_room(&mut alice, "dm-99").await;

    // when (操作):
    send_json(
        &mut carol,
        serde_json::json!({"type": "send_message", "room_id": "dm-99", "body": "hi"}),
    )
    .await;

    // then (期待する結果):
    let event = recv_json(&mut carol).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["code"], "not_a_member");
    assert_silent(&mut alice).await;
    assert!(server.store.messages_in(&room("dm-99")).await.is_empty());
}

#[tokio::test]
async fn test_offline_recipient_notification_is_stored() {
    // テスト項目: 相手がオフラインでも送信は成功し、通知はストアに記録される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_and_announce("1").await;
    join_room(&mut alice, "dm-12").await;

    // when (操作):
    send_json(
        &mut alice,
        serde_json::json!({"type": "send_message", "room_id": "dm-12", "body": "ping"}),
    )
    .await;

    // then (期待する結果):
    let event = recv_json(&mut alice).await;
    assert_eq!(event["type"], "message_delivered");
    // イベントはセッションごとに順番に処理されるため、次の ack 後には通知の記録が終わっている
    join_room(&mut alice, "group-7").await;
    let notifications = server.store.notifications_for(&user("2")).await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].sender_name, "A");
}

#[tokio::test]
async fn test_invalid_events_are_reported() {
    // テスト項目: 不正なイベントは接続を切らずにエラーとして返される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect_and_announce("1").await;

    // when / then:
    alice
        .send(tokio_tungstenite::tungstenite::Message::Text("not json".into()))
        .await
        .unwrap();
    assert_eq!(recv_json(&mut alice).await["code"], "invalid_payload");

    send_json(
        &mut alice,
        serde_json::json!({"type": "join_room", "room_id": ""}),
    )
    .await;
    assert_eq!(recv_json(&mut alice).await["code"], "invalid_room_id");

    send_json(
        &mut alice,
        serde_json::json!({"type": "send_message", "room_id": "dm-12", "body": "   "}),
    )
    .await;
    assert_eq!(recv_json(&mut alice).await["code"], "invalid_message");

    // 接続は維持される
    join_room(&mut alice, "dm-12").await;
}

#[tokio::test]
async fn test_disconnect_cleans_up_presence_and_rooms() {
    // テスト項目: 切断でプレゼンスとルーム参加がすべて削除される
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();
    let mut alice = server.connect_and_announce("1").await;
    join_room(&mut alice, "dm-12").await;
    join_room(&mut alice, "group-7").await;

    // when (操作):
    alice.close(None).await.unwrap();

    // then (期待する結果):
    let mut cleaned = false;
    for _ in 0..20 {
        let presence: serde_json::Value = client
            .get(format!("{}/api/presence", server.base_url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let rooms: serde_json::Value = client
            .get(format!("{}/api/rooms", server.base_url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if presence["online"] == serde_json::json!([]) && rooms == serde_json::json!([]) {
            cleaned = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(cleaned, "session was not cleaned up after disconnect");
}
