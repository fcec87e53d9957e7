//! UseCase: アクティブな Room 一覧の取得

use std::sync::Arc;

use crate::domain::{LobbyRepository, Room};

/// Active rooms together with the size of the waiting queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListing {
    pub rooms: Vec<Room>,
    pub waiting_users: usize,
}

pub struct GetRoomsUseCase {
    repository: Arc<dyn LobbyRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> RoomListing {
        let rooms = self.repository.active_rooms().await;
        let waiting_users = self.repository.counts().await.waiting;
        RoomListing {
            rooms,
            waiting_users,
        }
    }
}
