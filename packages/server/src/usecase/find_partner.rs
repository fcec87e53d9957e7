//! UseCase: パートナー探し
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FindPartnerUseCase::execute() メソッド
//! - 待機 / ペア成立時の通知内容と initiator の割り当て
//!
//! ### なぜこのテストが必要か
//! - offer/answer の役割が両者で必ず 1 つずつになることを保証する
//! - 再マッチ時に元の相手へ通知が届くことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機、ペア成立
//! - 異常系：接続が登録されていない identity からの要求
//! - エッジケース：Room にいる状態からの再マッチ

use std::sync::Arc;

use crate::domain::{
    ClientId, ConnectionRegistry, LobbyRepository, MatchResult, RoomId, ServerEvent,
};

use super::error::FindPartnerError;

/// What the requester ended up with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindPartnerResult {
    Waiting { room_id: RoomId },
    Paired { room_id: RoomId, partner: ClientId },
}

/// パートナー探しのユースケース
pub struct FindPartnerUseCase {
    repository: Arc<dyn LobbyRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl FindPartnerUseCase {
    pub fn new(repository: Arc<dyn LobbyRepository>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// Match the client or queue it, and notify everyone involved.
    ///
    /// The newcomer is the initiator of the pair; the partner who was already
    /// waiting is not.
    pub async fn execute(&self, client_id: &ClientId) -> Result<FindPartnerResult, FindPartnerError> {
        if self.registry.lookup(client_id).await.is_none() {
            return Err(FindPartnerError::UnknownClient(client_id.to_string()));
        }

        tracing::info!("User {} looking for partner", client_id);
        let outcome = self.repository.find_or_create_room(client_id).await;

        if let Some(previous) = &outcome.previous
            && let Some(former) = &previous.remaining_partner
        {
            self.notify(
                former,
                ServerEvent::PartnerLeft {
                    room_id: previous.room_id.clone(),
                },
            )
            .await;
        }

        match outcome.result {
            MatchResult::Waiting { room_id } => {
                self.notify(
                    client_id,
                    ServerEvent::WaitingForPartner {
                        room_id: room_id.clone(),
                    },
                )
                .await;
                Ok(FindPartnerResult::Waiting { room_id })
            }
            MatchResult::Paired { room, partner } => {
                self.notify(
                    client_id,
                    ServerEvent::PartnerFound {
                        room_id: room.id.clone(),
                        partner_id: partner.clone(),
                        is_initiator: true,
                    },
                )
                .await;
                self.notify(
                    &partner,
                    ServerEvent::PartnerFound {
                        room_id: room.id.clone(),
                        partner_id: client_id.clone(),
                        is_initiator: false,
                    },
                )
                .await;
                Ok(FindPartnerResult::Paired {
                    room_id: room.id,
                    partner,
                })
            }
        }
    }

    async fn notify(&self, target: &ClientId, event: ServerEvent) {
        if let Err(e) = self.registry.push_to(target, event).await {
            tracing::debug!("Dropped notification for '{}': {}", target, e);
        }
    }
}
