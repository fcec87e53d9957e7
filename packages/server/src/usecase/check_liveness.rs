//! UseCase: ハートビート
//!
//! 前回の probe に応答しなかった接続を切り、残りに ping を送る。
//! 切られた接続の後始末は、その接続のハンドラが受信ループを抜けたときに行う。

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionRegistry, ProbeReport};

pub struct CheckLivenessUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl CheckLivenessUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> ProbeReport {
        let report = self.registry.probe_all().await;
        for client_id in &report.terminated {
            tracing::info!("Terminating unresponsive client: {}", client_id);
        }
        tracing::debug!(
            "Heartbeat: {} probed, {} terminated",
            report.probed.len(),
            report.terminated.len()
        );
        report
    }

    /// The connection answered a probe.
    pub async fn record_pong(&self, client_id: &ClientId) {
        self.registry.mark_alive(client_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockConnectionRegistry;

    #[tokio::test]
    async fn test_execute_returns_registry_report() {
        // テスト項目: registry の probe 結果がそのまま返される
        // given (前提条件):
        let silent = ClientId::generate();
        let report = ProbeReport {
            probed: vec![ClientId::generate()],
            terminated: vec![silent.clone()],
        };
        let expected = report.clone();
        let mut registry = MockConnectionRegistry::new();
        registry
            .expect_probe_all()
            .times(1)
            .returning(move || report.clone());
        let usecase = CheckLivenessUseCase::new(Arc::new(registry));

        // when (操作):
        let result = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(result, expected);
        assert_eq!(result.terminated, vec![silent]);
    }

    #[tokio::test]
    async fn test_record_pong_marks_connection_alive() {
        // テスト項目: pong を受け取ると registry の生存フラグが立てられる
        // given (前提条件):
        let client_id = ClientId::generate();
        let expected = client_id.clone();
        let mut registry = MockConnectionRegistry::new();
        registry
            .expect_mark_alive()
            .withf(move |id| id == &expected)
            .times(1)
            .returning(|_| ());
        let usecase = CheckLivenessUseCase::new(Arc::new(registry));

        // when (操作):
        usecase.record_pong(&client_id).await;

        // then (期待する結果):
        // mock の times(1) で検証される
    }
}
