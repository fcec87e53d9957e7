//! HTTP API endpoint handlers.
//!
//! Everything except the health check requires `Authorization: Bearer <admin token>`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{CleanupDto, HealthDto, RoomDto, RoomListDto, StatsDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};
use deai_shared::time::timestamp_to_rfc3339;

const SERVICE_NAME: &str = "deai-signaling";
const CLEANUP_MESSAGE: &str = "Cleanup completed";

fn authorize(headers: &HeaderMap, admin_token: &str) -> Result<(), StatusCode> {
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == admin_token => Ok(()),
        _ => {
            tracing::warn!("Rejected admin request without a valid token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok",
        timestamp: timestamp_to_rfc3339(state.clock.now_millis()),
        service: SERVICE_NAME,
    })
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsDto>, StatusCode> {
    authorize(&headers, &state.admin_token)?;
    let stats = state.get_stats_usecase.execute().await;

    Ok(Json(StatsDto {
        total_rooms: stats.lobby.total_rooms,
        active_rooms: stats.lobby.active_rooms,
        waiting_users: stats.lobby.waiting,
        connected_users: stats.connected_users,
    }))
}

/// Get list of active rooms
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RoomListDto>, StatusCode> {
    authorize(&headers, &state.admin_token)?;
    let listing = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Ok(Json(RoomListDto {
        rooms: listing.rooms.into_iter().map(RoomDto::from).collect(),
        waiting_users: listing.waiting_users,
    }))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDto>, StatusCode> {
    authorize(&headers, &state.admin_token)?;
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_room_detail_usecase.execute(&room_id).await {
        Ok(room) => Ok(Json(room.into())),
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}

/// Run the janitor sweep now
pub async fn run_cleanup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CleanupDto>, StatusCode> {
    authorize(&headers, &state.admin_token)?;
    let report = state.cleanup_usecase.execute().await;
    tracing::info!(
        "Manual cleanup: {} rooms removed, {} waiting users evicted",
        report.rooms_removed.len(),
        report.waiting_evicted.len()
    );

    Ok(Json(CleanupDto {
        message: CLEANUP_MESSAGE,
        rooms_removed: report.rooms_removed.len(),
        waiting_evicted: report.waiting_evicted.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authorize_accepts_matching_bearer_token() {
        // テスト項目: 一致する Bearer トークンは許可される
        // given (前提条件):
        let headers = headers_with("Bearer s3cret");

        // when (操作):
        let result = authorize(&headers, "s3cret");

        // then (期待する結果):
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_authorize_rejects_missing_or_wrong_token() {
        // テスト項目: ヘッダーなし・不一致・Bearer 以外のスキームは 401 になる
        // given (前提条件):
        let missing = HeaderMap::new();
        let wrong = headers_with("Bearer nope");
        let basic = headers_with("Basic s3cret");

        // when (操作):
        let results = [
            authorize(&missing, "s3cret"),
            authorize(&wrong, "s3cret"),
            authorize(&basic, "s3cret"),
        ];

        // then (期待する結果):
        for result in results {
            assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
        }
    }
}
