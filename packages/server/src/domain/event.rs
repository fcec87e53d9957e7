//! Events exchanged with connections.

use serde_json::Value;

use super::value_object::{ClientId, RoomId, Timestamp};

/// Category of a relayed client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    Offer,
    Answer,
    IceCandidate,
    Chat,
    ConnectionState,
}

/// A client payload to be forwarded to the sender's partner.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRequest {
    pub kind: RelayKind,
    pub payload: Value,
    /// Room the client believes it is in, when it said so.
    pub room_id: Option<RoomId>,
}

impl RelayRequest {
    pub fn new(kind: RelayKind, payload: Value, room_id: Option<RoomId>) -> Self {
        Self {
            kind,
            payload,
            room_id,
        }
    }
}

/// Outbound notification, independent of its wire encoding.
///
/// Relay payloads are opaque `Value`s forwarded exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connected {
        client_id: ClientId,
    },
    WaitingForPartner {
        room_id: RoomId,
    },
    PartnerFound {
        room_id: RoomId,
        partner_id: ClientId,
        is_initiator: bool,
    },
    Offer {
        offer: Value,
        from: ClientId,
    },
    Answer {
        answer: Value,
        from: ClientId,
    },
    IceCandidate {
        candidate: Value,
        from: ClientId,
    },
    ChatMessage {
        message: Value,
        from: ClientId,
        timestamp: Timestamp,
    },
    PartnerConnectionState {
        state: Value,
        from: ClientId,
    },
    PartnerDisconnected {
        room_id: RoomId,
    },
    PartnerLeft {
        room_id: RoomId,
    },
    LeftRoom,
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::WaitingForPartner { .. } => "waiting_for_partner",
            Self::PartnerFound { .. } => "partner_found",
            Self::Offer { .. } => "webrtc_offer",
            Self::Answer { .. } => "webrtc_answer",
            Self::IceCandidate { .. } => "webrtc_ice_candidate",
            Self::ChatMessage { .. } => "chat_message",
            Self::PartnerConnectionState { .. } => "partner_connection_state",
            Self::PartnerDisconnected { .. } => "partner_disconnected",
            Self::PartnerLeft { .. } => "partner_left",
            Self::LeftRoom => "left_room",
            Self::Error { .. } => "error",
        }
    }
}
