//! UseCase: Room 詳細の取得
//!
//! 待機中に予約されただけの room id はまだ Room ではないため見つからない扱い。

use std::sync::Arc;

use crate::domain::{LobbyRepository, Room, RoomId};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    repository: Arc<dyn LobbyRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<Room, GetRoomDetailError> {
        self.repository
            .get_room(room_id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ClientId, MatchResult},
        infrastructure::repository::InMemoryLobbyRepository,
    };
    use deai_shared::time::FixedClock;

    fn create_usecase() -> (GetRoomDetailUseCase, Arc<InMemoryLobbyRepository>) {
        let repository = Arc::new(InMemoryLobbyRepository::new(Arc::new(FixedClock::new(0))));
        (GetRoomDetailUseCase::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn test_matched_room_is_found() {
        // テスト項目: マッチ済みの Room は詳細を取得できる
        // given (前提条件):
        let (usecase, repository) = create_usecase();
        repository.find_or_create_room(&ClientId::generate()).await;
        let MatchResult::Paired { room, .. } = repository
            .find_or_create_room(&ClientId::generate())
            .await
            .result
        else {
            panic!("expected a pair");
        };

        // when (操作):
        let result = usecase.execute(&room.id).await;

        // then (期待する結果):
        assert_eq!(result, Ok(room));
    }

    #[tokio::test]
    async fn test_reserved_waiting_id_is_not_found() {
        // テスト項目: 待機中の予約 room id は RoomNotFound になる
        // given (前提条件):
        let (usecase, repository) = create_usecase();
        let MatchResult::Waiting { room_id } = repository
            .find_or_create_room(&ClientId::generate())
            .await
            .result
        else {
            panic!("expected waiting");
        };

        // when (操作):
        let result = usecase.execute(&room_id).await;

        // then (期待する結果):
        assert_eq!(result, Err(GetRoomDetailError::RoomNotFound));
    }
}
