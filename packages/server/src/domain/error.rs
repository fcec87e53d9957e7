//! Domain errors.

use thiserror::Error;

/// Invalid value object construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("client id must not be empty")]
    ClientIdEmpty,

    #[error("room id must not be empty")]
    RoomIdEmpty,
}

/// Failure to deliver an event to a live connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// No live connection is registered under this identity
    #[error("client '{0}' is not connected")]
    ClientNotFound(String),

    /// The connection is registered but its outbound channel is gone
    #[error("outbound channel of client '{0}' is closed")]
    ChannelClosed(String),

    #[error("failed to encode outbound event: {0}")]
    Encode(String),
}
