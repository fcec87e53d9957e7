//! UseCase: 定期クリーンアップ
//!
//! 一定時間を過ぎた非アクティブな Room と、待ちすぎた待機者を取り除く。
//! 取り除かれた待機者には通知しない。

use std::{sync::Arc, time::Duration};

use crate::domain::{LobbyRepository, SweepReport};

pub struct CleanupUseCase {
    repository: Arc<dyn LobbyRepository>,
    max_room_age: Duration,
    max_wait: Duration,
}

impl CleanupUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>, max_room_age: Duration, max_wait: Duration) -> Self {
        Self {
            repository,
            max_room_age,
            max_wait,
        }
    }

    pub async fn execute(&self) -> SweepReport {
        let report = self.repository.sweep(self.max_room_age, self.max_wait).await;
        for room in &report.rooms_removed {
            tracing::info!("Cleaned up inactive room: {}", room.id);
        }
        for entry in &report.waiting_evicted {
            tracing::info!("Evicted stale waiting user: {}", entry.client_id);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::ClientId, infrastructure::repository::InMemoryLobbyRepository};
    use deai_shared::time::ManualClock;

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_state() {
        // テスト項目: 期限切れの非アクティブ Room と待機者だけが取り除かれ、アクティブな Room は残る
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let repository = Arc::new(InMemoryLobbyRepository::new(clock.clone()));
        let usecase = CleanupUseCase::new(
            repository.clone(),
            Duration::from_secs(30 * 60),
            Duration::from_secs(10 * 60),
        );
        let (a, b, c, d) = (
            ClientId::generate(),
            ClientId::generate(),
            ClientId::generate(),
            ClientId::generate(),
        );
        // a-b: 片方が退出して非アクティブになる Room
        repository.find_or_create_room(&a).await;
        repository.find_or_create_room(&b).await;
        repository.leave_current(&a).await;
        // c-d: アクティブなまま残る Room
        repository.find_or_create_room(&c).await;
        repository.find_or_create_room(&d).await;
        let waiter = ClientId::generate();
        repository.find_or_create_room(&waiter).await;

        // when (操作):
        clock.advance(Duration::from_secs(30 * 60 + 1));
        let report = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(report.rooms_removed.len(), 1);
        assert!(report.rooms_removed[0].contains(&b));
        assert_eq!(report.waiting_evicted.len(), 1);
        assert_eq!(report.waiting_evicted[0].client_id, waiter);
        let counts = repository.counts().await;
        assert_eq!(counts.total_rooms, 1);
        assert_eq!(counts.active_rooms, 1);
        assert_eq!(counts.waiting, 0);
        assert!(repository.is_consistent().await);
    }
}
