//! InMemory Lobby Repository 実装
//!
//! ドメイン層が定義する LobbyRepository trait の具体的な実装。
//! 待機キュー・Room・index をまとめた `Lobby` を一つの Mutex で保護し、
//! 各操作を単一の排他区間で完結させます。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ClientId, LeaveOutcome, Lobby, LobbyCounts, LobbyRepository, MatchOutcome, Room, RoomId,
    SweepReport, Timestamp,
};
use deai_shared::time::Clock;

/// インメモリ Lobby Repository 実装
pub struct InMemoryLobbyRepository {
    lobby: Mutex<Lobby>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLobbyRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            lobby: Mutex::new(Lobby::new()),
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// Whether the stored state satisfies the lobby invariants.
    pub async fn is_consistent(&self) -> bool {
        self.lobby.lock().await.is_consistent()
    }
}

#[async_trait]
impl LobbyRepository for InMemoryLobbyRepository {
    async fn find_or_create_room(&self, client_id: &ClientId) -> MatchOutcome {
        let now = self.now();
        let mut lobby = self.lobby.lock().await;
        lobby.find_or_create_room(client_id, now)
    }

    async fn leave_current(&self, client_id: &ClientId) -> LeaveOutcome {
        let mut lobby = self.lobby.lock().await;
        lobby.leave_current(client_id)
    }

    async fn partner_of(&self, client_id: &ClientId) -> Option<(RoomId, ClientId)> {
        let lobby = self.lobby.lock().await;
        lobby.partner_of(client_id)
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let lobby = self.lobby.lock().await;
        lobby.room(room_id).cloned()
    }

    async fn active_rooms(&self) -> Vec<Room> {
        let lobby = self.lobby.lock().await;
        lobby.active_rooms()
    }

    async fn counts(&self) -> LobbyCounts {
        let lobby = self.lobby.lock().await;
        lobby.counts()
    }

    async fn sweep(&self, max_room_age: Duration, max_wait: Duration) -> SweepReport {
        let now = self.now();
        let mut lobby = self.lobby.lock().await;
        lobby.sweep(max_room_age, max_wait, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MatchResult;
    use deai_shared::time::{FixedClock, ManualClock};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 並行したマッチング要求が排他的に処理されること
    // - 注入した Clock に従って掃除が行われること
    // ========================================

    fn create_test_repository() -> Arc<InMemoryLobbyRepository> {
        Arc::new(InMemoryLobbyRepository::new(Arc::new(FixedClock::new(0))))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_never_share_a_waiting_entry() {
        // テスト項目: 同時に大量のマッチング要求が来ても、待機者が二重に取り出されない
        // given (前提条件):
        let repo = create_test_repository();
        let clients: Vec<ClientId> = (0..100).map(|_| ClientId::generate()).collect();

        // when (操作):
        let handles: Vec<_> = clients
            .iter()
            .cloned()
            .map(|client_id| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.find_or_create_room(&client_id).await })
            })
            .collect();
        let mut partners = Vec::new();
        for handle in handles {
            if let MatchResult::Paired { partner, .. } = handle.await.unwrap().result {
                partners.push(partner);
            }
        }

        // then (期待する結果):
        let counts = repo.counts().await;
        assert_eq!(partners.len(), 50);
        let mut unique = partners.clone();
        unique.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        unique.dedup();
        assert_eq!(unique.len(), 50);
        assert_eq!(counts.active_rooms, 50);
        assert_eq!(counts.waiting, 0);
        assert!(repo.is_consistent().await);
    }

    #[tokio::test]
    async fn test_sweep_uses_injected_clock() {
        // テスト項目: Clock の経過時間に従って待機者が掃除される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let repo = InMemoryLobbyRepository::new(clock.clone());
        let waiter = ClientId::generate();
        repo.find_or_create_room(&waiter).await;
        let max_wait = Duration::from_secs(10 * 60);
        let max_room_age = Duration::from_secs(30 * 60);

        // when (操作):
        let early = repo.sweep(max_room_age, max_wait).await;
        clock.advance(Duration::from_secs(10 * 60 + 1));
        let late = repo.sweep(max_room_age, max_wait).await;

        // then (期待する結果):
        assert!(early.waiting_evicted.is_empty());
        assert_eq!(late.waiting_evicted.len(), 1);
        assert_eq!(late.waiting_evicted[0].client_id, waiter);
        assert_eq!(repo.counts().await.waiting, 0);
    }

    #[tokio::test]
    async fn test_get_room_returns_matched_room() {
        // テスト項目: マッチ後の Room を id で取得できる
        // given (前提条件):
        let repo = create_test_repository();
        let x = ClientId::generate();
        let y = ClientId::generate();
        repo.find_or_create_room(&x).await;
        let outcome = repo.find_or_create_room(&y).await;
        let MatchResult::Paired { room, .. } = outcome.result else {
            panic!("expected a pair");
        };

        // when (操作):
        let fetched = repo.get_room(&room.id).await;
        let missing = repo.get_room(&RoomId::generate()).await;

        // then (期待する結果):
        assert_eq!(fetched, Some(room));
        assert_eq!(missing, None);
        assert_eq!(repo.active_rooms().await.len(), 1);
    }
}
