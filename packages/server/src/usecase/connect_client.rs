//! UseCase: 接続受付処理
//!
//! identity を払い出して接続を登録し、`connected` を本人に送る。

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionChannel, ConnectionRegistry, ServerEvent, Timestamp};
use deai_shared::time::Clock;

/// 接続受付のユースケース
pub struct ConnectClientUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Register the connection behind `channel` and greet it with its identity.
    pub async fn execute(&self, channel: ConnectionChannel) -> ClientId {
        let connected_at = Timestamp::new(self.clock.now_millis());
        let client_id = self.registry.register(channel, connected_at).await;
        tracing::info!("Client connected: {}", client_id);

        if let Err(e) = self
            .registry
            .push_to(
                &client_id,
                ServerEvent::Connected {
                    client_id: client_id.clone(),
                },
            )
            .await
        {
            tracing::warn!("Failed to greet client '{}': {}", client_id, e);
        }
        client_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Outbound, infrastructure::registry::WebSocketConnectionRegistry};
    use deai_shared::time::FixedClock;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_connect_registers_and_greets() {
        // テスト項目: 接続すると登録され、identity 付きの connected が届く
        // given (前提条件):
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = ConnectClientUseCase::new(registry.clone(), Arc::new(FixedClock::new(500)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        let client_id = usecase.execute(tx).await;

        // then (期待する結果):
        let info = registry.lookup(&client_id).await.unwrap();
        assert_eq!(info.connected_at, Timestamp::new(500));
        let Some(Outbound::Text(text)) = rx.recv().await else {
            panic!("expected a text frame");
        };
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["event"], "connected");
        assert_eq!(json["data"]["userId"], client_id.as_str());
    }
}
