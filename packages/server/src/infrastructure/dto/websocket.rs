//! WebSocket message DTOs.
//!
//! Every frame is a UTF-8 JSON object `{ "event": string, "data": object }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{RelayKind, RelayRequest, RoomId, ServerEvent};
use deai_shared::time::timestamp_to_rfc3339;

const CONNECTED_MESSAGE: &str = "Connected to video chat";
const PARTNER_GONE_MESSAGE: &str = "Your partner has disconnected";
const LEFT_ROOM_MESSAGE: &str = "You left the room";

/// Inbound envelope as it arrives on the wire
#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Client request after decoding
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    FindPartner,
    Relay(RelayRequest),
    LeaveRoom,
    NextPartner,
}

/// Client frame that cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid message format: {0}")]
    Malformed(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

/// Decode a text frame into a client request.
///
/// Relay payloads are not inspected; a missing payload field is relayed as `null`.
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    let envelope: InboundEnvelope =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let relay = |kind: RelayKind, field: &str| {
        ClientMessage::Relay(RelayRequest::new(
            kind,
            envelope.data.get(field).cloned().unwrap_or(Value::Null),
            room_id_of(&envelope.data),
        ))
    };

    match envelope.event.as_str() {
        "find_partner" => Ok(ClientMessage::FindPartner),
        "leave_room" => Ok(ClientMessage::LeaveRoom),
        "next_partner" => Ok(ClientMessage::NextPartner),
        "webrtc_offer" => Ok(relay(RelayKind::Offer, "offer")),
        "webrtc_answer" => Ok(relay(RelayKind::Answer, "answer")),
        "webrtc_ice_candidate" => Ok(relay(RelayKind::IceCandidate, "candidate")),
        "chat_message" => Ok(relay(RelayKind::Chat, "message")),
        "connection_state" => Ok(relay(RelayKind::ConnectionState, "state")),
        other => Err(ProtocolError::UnknownEvent(other.to_string())),
    }
}

fn room_id_of(data: &Value) -> Option<RoomId> {
    data.get("roomId")
        .and_then(Value::as_str)
        .and_then(|id| RoomId::new(id.to_string()).ok())
}

/// Outbound envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum OutboundMessage {
    Connected {
        user_id: String,
        message: String,
    },
    WaitingForPartner {
        room_id: String,
    },
    PartnerFound {
        room_id: String,
        partner_id: String,
        is_initiator: bool,
    },
    WebrtcOffer {
        offer: Value,
        from: String,
    },
    WebrtcAnswer {
        answer: Value,
        from: String,
    },
    WebrtcIceCandidate {
        candidate: Value,
        from: String,
    },
    ChatMessage {
        message: Value,
        from: String,
        timestamp: String,
    },
    PartnerConnectionState {
        state: Value,
        from: String,
    },
    PartnerDisconnected {
        message: String,
        room_id: String,
    },
    PartnerLeft {
        message: String,
        room_id: String,
    },
    LeftRoom {
        message: String,
    },
    Error {
        message: String,
    },
}

impl From<ServerEvent> for OutboundMessage {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Connected { client_id } => Self::Connected {
                user_id: client_id.into_string(),
                message: CONNECTED_MESSAGE.to_string(),
            },
            ServerEvent::WaitingForPartner { room_id } => Self::WaitingForPartner {
                room_id: room_id.into_string(),
            },
            ServerEvent::PartnerFound {
                room_id,
                partner_id,
                is_initiator,
            } => Self::PartnerFound {
                room_id: room_id.into_string(),
                partner_id: partner_id.into_string(),
                is_initiator,
            },
            ServerEvent::Offer { offer, from } => Self::WebrtcOffer {
                offer,
                from: from.into_string(),
            },
            ServerEvent::Answer { answer, from } => Self::WebrtcAnswer {
                answer,
                from: from.into_string(),
            },
            ServerEvent::IceCandidate { candidate, from } => Self::WebrtcIceCandidate {
                candidate,
                from: from.into_string(),
            },
            ServerEvent::ChatMessage {
                message,
                from,
                timestamp,
            } => Self::ChatMessage {
                message,
                from: from.into_string(),
                timestamp: timestamp_to_rfc3339(timestamp.value()),
            },
            ServerEvent::PartnerConnectionState { state, from } => Self::PartnerConnectionState {
                state,
                from: from.into_string(),
            },
            ServerEvent::PartnerDisconnected { room_id } => Self::PartnerDisconnected {
                message: PARTNER_GONE_MESSAGE.to_string(),
                room_id: room_id.into_string(),
            },
            ServerEvent::PartnerLeft { room_id } => Self::PartnerLeft {
                message: PARTNER_GONE_MESSAGE.to_string(),
                room_id: room_id.into_string(),
            },
            ServerEvent::LeftRoom => Self::LeftRoom {
                message: LEFT_ROOM_MESSAGE.to_string(),
            },
            ServerEvent::Error { message } => Self::Error { message },
        }
    }
}

/// Encode an event as a JSON text frame.
pub fn encode(event: ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundMessage::from(event))
}
