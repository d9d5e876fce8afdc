//! HTTP API endpoint handlers.
//!
//! 観測用のサイドチャネル。コアのプロトコルには含まれない。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sysinfo::{ProcessesToUpdate, System};

use connectsphere_shared::time::{timestamp_to_rfc3339, unix_timestamp_millis};

use crate::{
    infrastructure::dto::http::{ErrorDto, HealthDto, MemoryDto, RoomInfoDto, StatsDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let counts = state.room_query_usecase.counts().await;
    Json(HealthDto {
        status: "OK".to_string(),
        timestamp: timestamp_to_rfc3339(unix_timestamp_millis()),
        active_rooms: counts.active_rooms,
        active_users: counts.active_users,
    })
}

/// Get room information (for debugging)
pub async fn get_room_info(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfoDto>, (StatusCode, Json<ErrorDto>)> {
    match state.room_query_usecase.room_snapshot(room_id).await {
        Some(snapshot) => Ok(Json(RoomInfoDto {
            id: snapshot.id.as_str().to_string(),
            user_count: snapshot.members.len(),
            message_count: snapshot.messages.len(),
            created_at: timestamp_to_rfc3339(snapshot.created_at.value()),
            users: snapshot.members.into_iter().map(Into::into).collect(),
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorDto {
                error: "Room not found".to_string(),
            }),
        )),
    }
}

/// Get server statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    let counts = state.room_query_usecase.counts().await;
    Json(StatsDto {
        active_rooms: counts.active_rooms,
        active_users: counts.active_users,
        uptime: state.started_at.elapsed().as_secs(),
        memory: current_process_memory(),
    })
}

/// このプロセスの現在のメモリ使用量を取得する
fn current_process_memory() -> MemoryDto {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return MemoryDto {
            rss: 0,
            virtual_memory: 0,
        };
    };
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), false);
    match system.process(pid) {
        Some(process) => MemoryDto {
            rss: process.memory(),
            virtual_memory: process.virtual_memory(),
        },
        None => MemoryDto {
            rss: 0,
            virtual_memory: 0,
        },
    }
}
