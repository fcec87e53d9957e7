//! HTTP API response DTOs.

use serde::Serialize;

use crate::domain::Room;
use deai_shared::time::timestamp_to_rfc3339;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

/// Aggregate statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_rooms: usize,
    pub active_rooms: usize,
    pub waiting_users: usize,
    pub connected_users: usize,
}

/// Room detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    pub users: Vec<String>,
    pub created_at: String,
    pub is_active: bool,
}

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.into_string(),
            users: room
                .members
                .into_iter()
                .map(|member| member.into_string())
                .collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
            is_active: room.is_active,
        }
    }
}

/// Active room list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListDto {
    pub rooms: Vec<RoomDto>,
    pub waiting_users: usize,
}

/// Result of a manual cleanup
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupDto {
    pub message: &'static str,
    pub rooms_removed: usize,
    pub waiting_evicted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, RoomId, Timestamp};

    #[test]
    fn test_room_to_dto() {
        // テスト項目: ドメインの Room が DTO に変換される
        // given (前提条件):
        let room = Room::paired(
            RoomId::new("r1".to_string()).unwrap(),
            ClientId::new("alice".to_string()).unwrap(),
            ClientId::new("bob".to_string()).unwrap(),
            Timestamp::new(1672531200000),
        );

        // when (操作):
        let dto: RoomDto = room.into();

        // then (期待する結果):
        assert_eq!(dto.id, "r1");
        assert_eq!(dto.users, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(dto.created_at, "2023-01-01T00:00:00.000Z");
        assert!(dto.is_active);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        // テスト項目: 統計情報が camelCase のキーで出力される
        // given (前提条件):
        let stats = StatsDto {
            total_rooms: 3,
            active_rooms: 2,
            waiting_users: 1,
            connected_users: 6,
        };

        // when (操作):
        let json = serde_json::to_value(&stats).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "totalRooms": 3,
                "activeRooms": 2,
                "waitingUsers": 1,
                "connectedUsers": 6
            })
        );
    }
}
