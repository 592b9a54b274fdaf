//! HTTP API response DTOs for the relay.

use serde::{Deserialize, Serialize};

/// Live room summary for list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub room_id: String,
    pub member_count: usize,
}

/// Live room detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub room_id: String,
    /// User ids of the sessions currently joined, sorted
    pub members: Vec<String>,
}

/// Users with a registered session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceDto {
    pub online: Vec<String>,
}
