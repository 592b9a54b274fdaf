//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use learnlink_shared::time::{get_utc_timestamp, timestamp_to_rfc3339};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{PresenceDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server_time": timestamp_to_rfc3339(get_utc_timestamp()),
    }))
}

/// Get list of rooms with live members
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let summaries = state
        .rooms
        .summaries()
        .await
        .into_iter()
        .map(|summary| RoomSummaryDto {
            room_id: summary.room_id.into_string(),
            member_count: summary.member_count,
        })
        .collect();

    Json(summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::try_from(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    let members = state.rooms.member_users(&room_id).await;
    if members.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(RoomDetailDto {
        room_id: room_id.into_string(),
        members: members.into_iter().map(|id| id.into_string()).collect(),
    }))
}

/// Get users with a registered session
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let online = state
        .registry
        .online_users()
        .await
        .into_iter()
        .map(|id| id.into_string())
        .collect();

    Json(PresenceDto { online })
}
