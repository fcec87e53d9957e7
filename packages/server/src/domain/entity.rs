//! Entities: rooms and waiting-queue entries.

use super::value_object::{ClientId, RoomId, Timestamp};

/// A pairing room.
///
/// Rooms are only created for a matched pair. A room drops to one member when
/// a partner leaves and is then inactive for the rest of its life; it is never
/// revived, a fresh match always creates a new room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub members: Vec<ClientId>,
    pub created_at: Timestamp,
    pub is_active: bool,
}

impl Room {
    pub const CAPACITY: usize = 2;

    /// Create an active room for a matched pair. `waiting` is the member who
    /// was already queued, `requester` the one whose request made the match.
    pub fn paired(id: RoomId, waiting: ClientId, requester: ClientId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: vec![waiting, requester],
            created_at,
            is_active: true,
        }
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.members.contains(client_id)
    }

    /// The other member, if any.
    pub fn partner_of(&self, client_id: &ClientId) -> Option<&ClientId> {
        self.members.iter().find(|member| *member != client_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Remove a member. Returns `false` if it was not a member.
    pub(crate) fn remove_member(&mut self, client_id: &ClientId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member != client_id);
        let removed = self.members.len() != before;
        if removed {
            self.is_active = false;
        }
        removed
    }
}

/// An identity waiting for a partner.
///
/// `room_id` is reserved at enqueue time: it is reported to the waiter and
/// becomes the id of the room created when the waiter is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingEntry {
    pub client_id: ClientId,
    pub room_id: RoomId,
    pub enqueued_at: Timestamp,
}

impl WaitingEntry {
    pub fn new(client_id: ClientId, enqueued_at: Timestamp) -> Self {
        Self {
            client_id,
            room_id: RoomId::generate(),
            enqueued_at,
        }
    }
}
