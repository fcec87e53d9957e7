//! Domain layer: pairing state, identities and the seams to infrastructure.

pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod lobby;
pub mod repository;
pub mod value_object;

pub use connection::{ConnectionChannel, ConnectionInfo, ConnectionRegistry, Outbound, ProbeReport};
pub use entity::{Room, WaitingEntry};
pub use error::{PushError, ValueObjectError};
pub use event::{RelayKind, RelayRequest, ServerEvent};
pub use lobby::{
    Departure, LeaveOutcome, Lobby, LobbyCounts, MatchOutcome, MatchResult, RoomStore,
    SweepReport, WaitingQueue,
};
pub use repository::LobbyRepository;
pub use value_object::{ClientId, RoomId, Timestamp};

#[cfg(test)]
pub use connection::MockConnectionRegistry;
