//! Connection registry trait.
//!
//! The registry owns the lifetime of every live connection: it allocates the
//! identity, maps it to the connection's outbound channel and tracks the
//! liveness flag used by the heartbeat.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    error::PushError,
    event::ServerEvent,
    value_object::{ClientId, Timestamp},
};

/// Frame queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Encoded JSON envelope
    Text(String),
    /// Liveness probe
    Ping,
    /// Drop the transport without a close handshake
    Terminate,
}

/// Sending half of a connection's outbound queue
pub type ConnectionChannel = mpsc::UnboundedSender<Outbound>;

/// Snapshot of a registered connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub client_id: ClientId,
    pub connected_at: Timestamp,
    pub is_alive: bool,
}

/// Outcome of one heartbeat round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub probed: Vec<ClientId>,
    pub terminated: Vec<ClientId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Store a new live connection under a fresh identity.
    async fn register(&self, channel: ConnectionChannel, connected_at: Timestamp) -> ClientId;

    async fn lookup(&self, client_id: &ClientId) -> Option<ConnectionInfo>;

    /// Remove a connection. Returns whether it was registered.
    async fn forget(&self, client_id: &ClientId) -> bool;

    /// Encode and queue an event for one connection.
    async fn push_to(&self, client_id: &ClientId, event: ServerEvent) -> Result<(), PushError>;

    /// Record a probe answer.
    async fn mark_alive(&self, client_id: &ClientId);

    /// Terminate connections that missed the previous probe, probe the rest.
    async fn probe_all(&self) -> ProbeReport;

    async fn count(&self) -> usize;
}
