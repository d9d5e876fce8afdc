//! HTTP API response DTOs.

use serde::Serialize;

use super::websocket::ParticipantDto;

/// GET /health response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: String,
    pub timestamp: String,
    pub active_rooms: usize,
    pub active_users: usize,
}

/// GET /api/room/{room_id} response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoDto {
    pub id: String,
    pub user_count: usize,
    pub message_count: usize,
    pub created_at: String,
    pub users: Vec<ParticipantDto>,
}

/// Process memory figures for GET /api/stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDto {
    /// Resident set size in bytes
    pub rss: u64,
    /// Virtual memory size in bytes
    pub virtual_memory: u64,
}

/// GET /api/stats response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub active_rooms: usize,
    pub active_users: usize,
    /// Seconds since the server started
    pub uptime: u64,
    pub memory: MemoryDto,
}

/// Error body for HTTP endpoints (e.g. 404)
#[derive(Debug, Serialize)]
pub struct ErrorDto {
    pub error: String,
}
