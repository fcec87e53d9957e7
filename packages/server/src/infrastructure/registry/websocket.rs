//! WebSocket を使った ConnectionRegistry 実装
//!
//! ## 責務
//!
//! - identity の払い出しと、identity → 送信チャンネルの対応表の管理
//! - クライアントへのイベント送信（push_to）
//! - ハートビート用の生存フラグ管理（probe_all / mark_alive）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された送信チャンネルを受け取り、identity をキーに直接引けるよう保持します。

use std::collections::{HashMap, hash_map::Entry};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ClientId, ConnectionChannel, ConnectionInfo, ConnectionRegistry, Outbound, ProbeReport,
        PushError, ServerEvent, Timestamp,
    },
    infrastructure::dto::websocket::encode,
};

struct ConnectionEntry {
    channel: ConnectionChannel,
    connected_at: Timestamp,
    is_alive: bool,
}

/// WebSocket を使った ConnectionRegistry 実装
#[derive(Default)]
pub struct WebSocketConnectionRegistry {
    /// Key: identity, Value: 送信チャンネルと生存フラグ
    connections: Mutex<HashMap<ClientId, ConnectionEntry>>,
}

impl WebSocketConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for WebSocketConnectionRegistry {
    async fn register(&self, channel: ConnectionChannel, connected_at: Timestamp) -> ClientId {
        let mut connections = self.connections.lock().await;
        loop {
            let client_id = ClientId::generate();
            match connections.entry(client_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(ConnectionEntry {
                        channel,
                        connected_at,
                        is_alive: true,
                    });
                    tracing::debug!("Client '{}' registered", client_id);
                    return client_id;
                }
                Entry::Occupied(_) => {
                    tracing::warn!("Identity '{}' is still registered, drawing another", client_id);
                }
            }
        }
    }

    async fn lookup(&self, client_id: &ClientId) -> Option<ConnectionInfo> {
        let connections = self.connections.lock().await;
        connections.get(client_id).map(|entry| ConnectionInfo {
            client_id: client_id.clone(),
            connected_at: entry.connected_at,
            is_alive: entry.is_alive,
        })
    }

    async fn forget(&self, client_id: &ClientId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(client_id).is_some();
        if removed {
            tracing::debug!("Client '{}' unregistered", client_id);
        }
        removed
    }

    async fn push_to(&self, client_id: &ClientId, event: ServerEvent) -> Result<(), PushError> {
        let name = event.name();
        let text = encode(event).map_err(|e| PushError::Encode(e.to_string()))?;

        let connections = self.connections.lock().await;
        let entry = connections
            .get(client_id)
            .ok_or_else(|| PushError::ClientNotFound(client_id.to_string()))?;
        entry
            .channel
            .send(Outbound::Text(text))
            .map_err(|_| PushError::ChannelClosed(client_id.to_string()))?;
        tracing::debug!("Pushed '{}' to client '{}'", name, client_id);
        Ok(())
    }

    async fn mark_alive(&self, client_id: &ClientId) {
        let mut connections = self.connections.lock().await;
        if let Some(entry) = connections.get_mut(client_id) {
            entry.is_alive = true;
        }
    }

    async fn probe_all(&self) -> ProbeReport {
        let mut connections = self.connections.lock().await;
        let mut report = ProbeReport::default();

        for (client_id, entry) in connections.iter_mut() {
            if !entry.is_alive {
                // 前回の probe に応答がなかった
                let _ = entry.channel.send(Outbound::Terminate);
                report.terminated.push(client_id.clone());
                continue;
            }
            entry.is_alive = false;
            if entry.channel.send(Outbound::Ping).is_err() {
                report.terminated.push(client_id.clone());
            } else {
                report.probed.push(client_id.clone());
            }
        }

        // 送信側タスクが既に終わっている接続は、ここで片付ける
        connections.retain(|_, entry| !entry.channel.is_closed());
        report
    }

    async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}
