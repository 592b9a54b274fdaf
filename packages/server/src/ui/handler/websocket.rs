//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{MessageBody, RoomId, UserId, VerifiedToken},
    infrastructure::{
        dto::websocket::{ClientEvent, ErrorCode, ServerEvent},
        session::SessionHandle,
    },
    ui::state::{AppState, ConnectQuery},
    usecase::{
        AnnouncePresenceUseCase, AuthenticateSessionUseCase, DisconnectSessionUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, NotifyRecipientUseCase, SendMessageUseCase,
    },
};

/// Upgrade `GET /ws` after the token check.
///
/// Unauthenticated requests get `401` and never reach the upgrade.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let token = bearer_token(&headers).or(query.token.as_deref());

    let auth_usecase = AuthenticateSessionUseCase::new(state.verifier.clone());
    let verified = match auth_usecase.execute(token) {
        Ok(verified) => verified,
        Err(e) => {
            tracing::warn!(error = %e, "handshake rejected");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    tracing::info!(user_id = %verified.user_id, "handshake accepted");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, verified)))
}

/// `Authorization: Bearer <token>` の値
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, verified: VerifiedToken) {
    let (mut sender, mut receiver) = socket.split();

    // Channel drained by the writer task; the handle is how everyone else reaches this socket
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let session = SessionHandle::new(verified.user_id, tx).with_display_name(verified.name);
    let session_id = session.id();
    tracing::info!(user_id = %session.user_id(), session_id = %session_id, "session opened");

    let recv_session = session.clone();
    let recv_state = state.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(session_id = %recv_session.id(), "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch(&recv_state, &recv_session, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!(session_id = %recv_session.id(), "client requested close");
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to write queued events to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let disconnect_usecase = DisconnectSessionUseCase::new(state.registry.clone(), state.rooms.clone());
    disconnect_usecase.execute(session_id).await;
}

/// 受信したイベント 1 件を処理する
async fn dispatch(state: &AppState, session: &SessionHandle, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(session_id = %session.id(), "Failed to parse event: {}", e);
            reply(session, ServerEvent::error(ErrorCode::InvalidPayload, e.to_string()));
            return;
        }
    };

    match event {
        ClientEvent::AnnouncePresence { user_id } => {
            let claimed = match UserId::try_from(user_id) {
                Ok(id) => id,
                Err(e) => {
                    reply(session, ServerEvent::error(ErrorCode::InvalidPayload, e.to_string()));
                    return;
                }
            };

            let usecase = AnnouncePresenceUseCase::new(state.registry.clone());
            match usecase.execute(session, claimed).await {
                Ok(_) => reply(
                    session,
                    ServerEvent::PresenceAnnounced {
                        user_id: session.user_id().to_string(),
                    },
                ),
                Err(e) => {
                    tracing::warn!(session_id = %session.id(), "{}", e);
                    reply(session, ServerEvent::error(e.code(), e.to_string()));
                }
            }
        }
        ClientEvent::JoinRoom { room_id } => {
            let Some(room_id) = parse_room_id(session, room_id) else {
                return;
            };
            JoinRoomUseCase::new(state.rooms.clone())
                .execute(session, &room_id)
                .await;
            reply(
                session,
                ServerEvent::RoomJoined {
                    room_id: room_id.into_string(),
                },
            );
        }
        ClientEvent::LeaveRoom { room_id } => {
            let Some(room_id) = parse_room_id(session, room_id) else {
                return;
            };
            LeaveRoomUseCase::new(state.rooms.clone())
                .execute(session, &room_id)
                .await;
            reply(
                session,
                ServerEvent::RoomLeft {
                    room_id: room_id.into_string(),
                },
            );
        }
        ClientEvent::SendMessage { room_id, body } => {
            let Some(room_id) = parse_room_id(session, room_id) else {
                return;
            };
            let body = match MessageBody::try_from(body) {
                Ok(body) => body,
                Err(e) => {
                    reply(session, ServerEvent::error(ErrorCode::InvalidMessage, e.to_string()));
                    return;
                }
            };

            let notifier = NotifyRecipientUseCase::new(
                state.registry.clone(),
                state.directory.clone(),
                state.notification_store.clone(),
            );
            let usecase = SendMessageUseCase::new(
                state.message_store.clone(),
                state.registry.clone(),
                state.rooms.clone(),
                notifier,
            );

            match usecase.execute(session, room_id, body).await {
                Ok(outcome) => {
                    tracing::debug!(
                        message_id = %outcome.message.id,
                        delivered = outcome.delivered_to.len(),
                        "message relayed"
                    );
                }
                Err(e) => {
                    tracing::warn!(session_id = %session.id(), "Failed to send message: {}", e);
                    reply(session, ServerEvent::error(e.code(), e.to_string()));
                }
            }
        }
    }
}

fn parse_room_id(session: &SessionHandle, room_id: String) -> Option<RoomId> {
    match RoomId::try_from(room_id) {
        Ok(room_id) => Some(room_id),
        Err(e) => {
            reply(session, ServerEvent::error(ErrorCode::InvalidRoomId, e.to_string()));
            None
        }
    }
}

fn reply(session: &SessionHandle, event: ServerEvent) {
    if let Err(e) = session.emit(event) {
        tracing::debug!("{}", e);
    }
}
