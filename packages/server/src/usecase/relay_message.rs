//! UseCase: パートナーへのメッセージ中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - 中継先の解決（サーバー側 index による相手の特定）と送信内容
//!
//! ### なぜこのテストが必要か
//! - ペイロードが一切加工されずに相手へ届くことを保証する
//! - 相手がいない / roomId が古い場合に黙って捨てられることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：offer / chat の中継
//! - 異常系：相手の接続が既に閉じている
//! - エッジケース：Room に入っていない、roomId が現在の Room と一致しない

use std::sync::Arc;

use crate::domain::{
    ClientId, ConnectionRegistry, LobbyRepository, RelayKind, RelayRequest, ServerEvent,
    Timestamp,
};
use deai_shared::time::Clock;

/// Why a relay was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Sender is not in a room
    NoPartner,
    /// Sender named a room it is no longer in
    StaleRoom,
    /// Partner's connection is gone
    PartnerOffline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered { to: ClientId },
    Dropped(DropReason),
}

/// 中継のユースケース
pub struct RelayMessageUseCase {
    repository: Arc<dyn LobbyRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl RelayMessageUseCase {
    pub fn new(
        repository: Arc<dyn LobbyRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            clock,
        }
    }

    /// Forward the payload to the sender's partner, tagged with the sender.
    pub async fn execute(&self, sender: &ClientId, request: RelayRequest) -> RelayOutcome {
        let Some((room_id, partner)) = self.repository.partner_of(sender).await else {
            tracing::debug!("Dropped {:?} from '{}': not in a room", request.kind, sender);
            return RelayOutcome::Dropped(DropReason::NoPartner);
        };

        if let Some(claimed) = &request.room_id
            && claimed != &room_id
        {
            tracing::debug!(
                "Dropped {:?} from '{}': room '{}' is stale (current '{}')",
                request.kind,
                sender,
                claimed,
                room_id
            );
            return RelayOutcome::Dropped(DropReason::StaleRoom);
        }

        let event = self.to_event(sender, request);
        let name = event.name();
        match self.registry.push_to(&partner, event).await {
            Ok(()) => {
                tracing::debug!("Relayed '{}' from '{}' to '{}'", name, sender, partner);
                RelayOutcome::Delivered { to: partner }
            }
            Err(e) => {
                tracing::debug!("Dropped '{}' from '{}': {}", name, sender, e);
                RelayOutcome::Dropped(DropReason::PartnerOffline)
            }
        }
    }

    fn to_event(&self, sender: &ClientId, request: RelayRequest) -> ServerEvent {
        let from = sender.clone();
        match request.kind {
            RelayKind::Offer => ServerEvent::Offer {
                offer: request.payload,
                from,
            },
            RelayKind::Answer => ServerEvent::Answer {
                answer: request.payload,
                from,
            },
            RelayKind::IceCandidate => ServerEvent::IceCandidate {
                candidate: request.payload,
                from,
            },
            RelayKind::Chat => ServerEvent::ChatMessage {
                message: request.payload,
                from,
                timestamp: Timestamp::new(self.clock.now_millis()),
            },
            RelayKind::ConnectionState => ServerEvent::PartnerConnectionState {
                state: request.payload,
                from,
            },
        }
    }
}
