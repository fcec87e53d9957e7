//! UseCase: 切断処理
//!
//! 接続が閉じた（もしくはハートビートで切られた）クライアントを
//! マッチング状態と接続一覧の両方から取り除く。

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionRegistry};

use super::leave_room::{LeaveReason, LeaveRoomUseCase};

/// 切断処理のユースケース
pub struct DisconnectClientUseCase {
    leave_room: Arc<LeaveRoomUseCase>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectClientUseCase {
    pub fn new(leave_room: Arc<LeaveRoomUseCase>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            leave_room,
            registry,
        }
    }

    /// Safe to call more than once for the same identity.
    pub async fn execute(&self, client_id: &ClientId) {
        self.leave_room
            .execute(client_id, LeaveReason::Disconnected)
            .await;
        if self.registry.forget(client_id).await {
            tracing::info!("Client disconnected: {}", client_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{LobbyRepository, Outbound, Timestamp},
        infrastructure::{
            registry::WebSocketConnectionRegistry, repository::InMemoryLobbyRepository,
        },
    };
    use deai_shared::time::FixedClock;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_disconnect_twice_notifies_partner_once() {
        // テスト項目: 同じクライアントの切断処理を 2 回行っても、相手への通知は 1 回だけ
        // given (前提条件):
        let repository = Arc::new(InMemoryLobbyRepository::new(Arc::new(FixedClock::new(0))));
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let leave = Arc::new(LeaveRoomUseCase::new(repository.clone(), registry.clone()));
        let usecase = DisconnectClientUseCase::new(leave, registry.clone());
        let (tx_x, _rx_x) = mpsc::unbounded_channel();
        let (tx_y, mut rx_y) = mpsc::unbounded_channel();
        let x = registry.register(tx_x, Timestamp::new(0)).await;
        let y = registry.register(tx_y, Timestamp::new(0)).await;
        repository.find_or_create_room(&x).await;
        repository.find_or_create_room(&y).await;

        // when (操作):
        usecase.execute(&x).await;
        usecase.execute(&x).await;

        // then (期待する結果):
        let mut frames = Vec::new();
        while let Ok(frame) = rx_y.try_recv() {
            frames.push(frame);
        }
        assert_eq!(frames.len(), 1);
        let Outbound::Text(text) = &frames[0] else {
            panic!("expected a text frame");
        };
        assert!(text.contains("partner_disconnected"));
        assert!(registry.lookup(&x).await.is_none());
        assert_eq!(registry.count().await, 1);
        assert!(repository.partner_of(&y).await.is_none());
        assert!(repository.is_consistent().await);
    }
}
