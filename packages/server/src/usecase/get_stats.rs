//! UseCase: 統計情報の取得

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, LobbyCounts, LobbyRepository};

/// Server-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStats {
    pub lobby: LobbyCounts,
    pub connected_users: usize,
}

pub struct GetStatsUseCase {
    repository: Arc<dyn LobbyRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl GetStatsUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn execute(&self) -> ServerStats {
        ServerStats {
            lobby: self.repository.counts().await,
            connected_users: self.registry.count().await,
        }
    }
}
