//! UseCase: Room からの退出処理
//!
//! leave_room / next_partner / 切断の 3 つの経路で共有される。
//! 相手への通知イベントは経路によって異なる。

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionRegistry, LeaveOutcome, LobbyRepository, ServerEvent};

/// Why the client is leaving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// Explicit `leave_room`
    LeaveRoom,
    /// `next_partner`; the caller queues the client again afterwards
    NextPartner,
    /// Connection closed or evicted
    Disconnected,
}

/// 退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn LobbyRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// Take the client out of its room and the waiting queue.
    ///
    /// The remaining partner learns about it with `partner_disconnected` when
    /// the connection dropped, `partner_left` otherwise. Only an explicit
    /// leave is confirmed back to the client, and only when there was
    /// something to leave.
    pub async fn execute(&self, client_id: &ClientId, reason: LeaveReason) -> LeaveOutcome {
        let outcome = self.repository.leave_current(client_id).await;

        if let Some(entry) = &outcome.cancelled_wait {
            tracing::debug!("User {} stopped waiting ({})", client_id, entry.room_id);
        }

        if let Some(departure) = &outcome.departure {
            tracing::info!(
                "User {} left room {} ({:?}), room deleted: {}",
                client_id,
                departure.room_id,
                reason,
                departure.room_deleted
            );
        }

        if let Some((room_id, partner)) = outcome.remaining_partner() {
            let room_id = room_id.clone();
            let event = match reason {
                LeaveReason::Disconnected => ServerEvent::PartnerDisconnected { room_id },
                LeaveReason::LeaveRoom | LeaveReason::NextPartner => {
                    ServerEvent::PartnerLeft { room_id }
                }
            };
            if let Err(e) = self.registry.push_to(partner, event).await {
                tracing::debug!("Partner '{}' not notified: {}", partner, e);
            }
        }

        if reason == LeaveReason::LeaveRoom
            && outcome.left_anything()
            && let Err(e) = self.registry.push_to(client_id, ServerEvent::LeftRoom).await
        {
            tracing::debug!("Client '{}' not notified: {}", client_id, e);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionChannel, Outbound, Timestamp},
        infrastructure::{
            registry::WebSocketConnectionRegistry, repository::InMemoryLobbyRepository,
        },
    };
    use deai_shared::time::FixedClock;
    use serde_json::Value;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 経路ごとの相手への通知イベントの違い
    // - left_room が本人に届く条件
    // ========================================

    struct Fixture {
        usecase: LeaveRoomUseCase,
        repository: Arc<InMemoryLobbyRepository>,
        registry: Arc<WebSocketConnectionRegistry>,
    }

    fn create_fixture() -> Fixture {
        let repository = Arc::new(InMemoryLobbyRepository::new(Arc::new(FixedClock::new(0))));
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        Fixture {
            usecase: LeaveRoomUseCase::new(repository.clone(), registry.clone()),
            repository,
            registry,
        }
    }

    async fn connect(
        registry: &WebSocketConnectionRegistry,
    ) -> (ClientId, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx): (ConnectionChannel, _) = mpsc::unbounded_channel();
        (registry.register(tx, Timestamp::new(0)).await, rx)
    }

    fn event_names(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(Outbound::Text(text)) = rx.try_recv() {
            let json: Value = serde_json::from_str(&text).unwrap();
            names.push(json["event"].as_str().unwrap().to_string());
        }
        names
    }

    type Connected = (ClientId, mpsc::UnboundedReceiver<Outbound>);

    async fn pair(fixture: &Fixture) -> (Connected, Connected) {
        let (x, rx_x) = connect(&fixture.registry).await;
        let (y, rx_y) = connect(&fixture.registry).await;
        fixture.repository.find_or_create_room(&x).await;
        fixture.repository.find_or_create_room(&y).await;
        ((x, rx_x), (y, rx_y))
    }

    #[tokio::test]
    async fn test_leave_room_notifies_partner_and_self() {
        // テスト項目: leave_room では相手に partner_left、本人に left_room が届く
        // given (前提条件):
        let fixture = create_fixture();
        let ((x, mut rx_x), (y, mut rx_y)) = pair(&fixture).await;

        // when (操作):
        let outcome = fixture.usecase.execute(&x, LeaveReason::LeaveRoom).await;

        // then (期待する結果):
        assert_eq!(outcome.remaining_partner().map(|(_, p)| p.clone()), Some(y));
        assert_eq!(event_names(&mut rx_x), vec!["left_room"]);
        assert_eq!(event_names(&mut rx_y), vec!["partner_left"]);
        assert_eq!(fixture.repository.counts().await.active_rooms, 0);
    }

    #[tokio::test]
    async fn test_disconnect_notifies_partner_disconnected() {
        // テスト項目: 切断では相手に partner_disconnected が届き、本人には何も送らない
        // given (前提条件):
        let fixture = create_fixture();
        let ((x, mut rx_x), (_y, mut rx_y)) = pair(&fixture).await;

        // when (操作):
        fixture.usecase.execute(&x, LeaveReason::Disconnected).await;

        // then (期待する結果):
        assert!(event_names(&mut rx_x).is_empty());
        assert_eq!(event_names(&mut rx_y), vec!["partner_disconnected"]);
    }

    #[tokio::test]
    async fn test_next_partner_notifies_partner_left_only() {
        // テスト項目: next_partner では相手に partner_left が届き、本人への left_room はない
        // given (前提条件):
        let fixture = create_fixture();
        let ((x, mut rx_x), (_y, mut rx_y)) = pair(&fixture).await;

        // when (操作):
        fixture.usecase.execute(&x, LeaveReason::NextPartner).await;

        // then (期待する結果):
        assert!(event_names(&mut rx_x).is_empty());
        assert_eq!(event_names(&mut rx_y), vec!["partner_left"]);
    }

    #[tokio::test]
    async fn test_leave_room_while_waiting_cancels_wait() {
        // テスト項目: 待機中の leave_room は待機を取り消し、left_room が届く
        // given (前提条件):
        let fixture = create_fixture();
        let (x, mut rx_x) = connect(&fixture.registry).await;
        fixture.repository.find_or_create_room(&x).await;

        // when (操作):
        let outcome = fixture.usecase.execute(&x, LeaveReason::LeaveRoom).await;

        // then (期待する結果):
        assert!(outcome.cancelled_wait.is_some());
        assert_eq!(event_names(&mut rx_x), vec!["left_room"]);
        assert_eq!(fixture.repository.counts().await.waiting, 0);
    }

    #[tokio::test]
    async fn test_leave_room_with_nothing_to_leave_is_silent() {
        // テスト項目: どこにも属していない状態の leave_room は何も送らない
        // given (前提条件):
        let fixture = create_fixture();
        let (x, mut rx_x) = connect(&fixture.registry).await;

        // when (操作):
        let outcome = fixture.usecase.execute(&x, LeaveReason::LeaveRoom).await;

        // then (期待する結果):
        assert!(!outcome.left_anything());
        assert!(event_names(&mut rx_x).is_empty());
    }
}
