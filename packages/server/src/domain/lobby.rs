//! Pairing state: waiting queue, room store and the matchmaker over both.
//!
//! Everything here is synchronous and clock-free (callers pass `now`), so the
//! whole `Lobby` can sit behind one lock and every operation on it is a single
//! critical section. The identity-to-room index lives inside `RoomStore` and is
//! only ever updated together with room membership.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::{
    entity::{Room, WaitingEntry},
    value_object::{ClientId, RoomId, Timestamp},
};

/// FIFO list of identities seeking a partner. At most one entry per identity.
#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: VecDeque<WaitingEntry>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Returns `false` and leaves the queue untouched if the
    /// identity is already waiting.
    pub fn enqueue(&mut self, entry: WaitingEntry) -> bool {
        if self.contains(&entry.client_id) {
            tracing::warn!("Client '{}' is already waiting, not enqueued twice", entry.client_id);
            return false;
        }
        self.entries.push_back(entry);
        true
    }

    /// Remove and return the earliest entry whose identity differs from `client_id`.
    pub fn dequeue_other_than(&mut self, client_id: &ClientId) -> Option<WaitingEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| &entry.client_id != client_id)?;
        self.entries.remove(position)
    }

    /// Remove the entry of `client_id` if present.
    pub fn remove(&mut self, client_id: &ClientId) -> Option<WaitingEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| &entry.client_id == client_id)?;
        self.entries.remove(position)
    }

    /// Remove and return every entry that has waited longer than `max_age`.
    pub fn evict_older_than(&mut self, max_age: Duration, now: Timestamp) -> Vec<WaitingEntry> {
        let (expired, kept): (VecDeque<_>, VecDeque<_>) = self
            .entries
            .drain(..)
            .partition(|entry| entry.enqueued_at.is_older_than(max_age, now));
        self.entries = kept;
        expired.into()
    }

    pub fn get(&self, client_id: &ClientId) -> Option<&WaitingEntry> {
        self.entries.iter().find(|entry| &entry.client_id == client_id)
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.get(client_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaitingEntry> {
        self.entries.iter()
    }
}

/// Result of removing an identity from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_id: RoomId,
    /// Member still in the room after the departure, to be told its partner left.
    pub remaining_partner: Option<ClientId>,
    pub room_deleted: bool,
}

/// Rooms plus the identity-to-room index.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
    index: HashMap<ClientId, RoomId>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an active room for a matched pair and index both members.
    pub fn create_pair(
        &mut self,
        room_id: RoomId,
        waiting: ClientId,
        requester: ClientId,
        now: Timestamp,
    ) -> Room {
        debug_assert!(!self.index.contains_key(&waiting));
        debug_assert!(!self.index.contains_key(&requester));

        let room = Room::paired(room_id, waiting, requester, now);
        for member in &room.members {
            self.index.insert(member.clone(), room.id.clone());
        }
        self.rooms.insert(room.id.clone(), room.clone());
        room
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Room the identity currently belongs to.
    pub fn room_of(&self, client_id: &ClientId) -> Option<&Room> {
        self.index
            .get(client_id)
            .and_then(|room_id| self.rooms.get(room_id))
    }

    /// Remove `client_id` from `room_id`.
    ///
    /// Deletes the room once empty, otherwise leaves it inactive. The index
    /// entry is dropped whenever it points at `room_id`, whether or not the
    /// room still exists. Returns `None` when the identity was not a member.
    pub fn leave(&mut self, client_id: &ClientId, room_id: &RoomId) -> Option<Departure> {
        if self.index.get(client_id) == Some(room_id) {
            self.index.remove(client_id);
        }

        let room = self.rooms.get_mut(room_id)?;
        if !room.remove_member(client_id) {
            return None;
        }

        let remaining_partner = room.members.first().cloned();
        let room_deleted = room.is_empty();
        if room_deleted {
            self.rooms.remove(room_id);
            tracing::info!("Deleted empty room {}", room_id);
        }

        Some(Departure {
            room_id: room_id.clone(),
            remaining_partner,
            room_deleted,
        })
    }

    /// Delete every inactive room created more than `max_age` ago and clear
    /// its members from the index.
    pub fn sweep_inactive(&mut self, max_age: Duration, now: Timestamp) -> Vec<Room> {
        let expired: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|room| !room.is_active && room.created_at.is_older_than(max_age, now))
            .map(|room| room.id.clone())
            .collect();

        let mut removed = Vec::with_capacity(expired.len());
        for room_id in expired {
            if let Some(room) = self.rooms.remove(&room_id) {
                for member in &room.members {
                    if self.index.get(member) == Some(&room_id) {
                        self.index.remove(member);
                    }
                }
                removed.push(room);
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn active_count(&self) -> usize {
        self.rooms.values().filter(|room| room.is_active).count()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Index and membership agree in both directions and no room exceeds capacity.
    pub fn is_consistent(&self) -> bool {
        let members_indexed = self.rooms.values().all(|room| {
            room.members.len() <= Room::CAPACITY
                && room
                    .members
                    .iter()
                    .all(|member| self.index.get(member) == Some(&room.id))
        });
        let index_backed = self.index.iter().all(|(client_id, room_id)| {
            self.rooms
                .get(room_id)
                .is_some_and(|room| room.contains(client_id))
        });
        members_indexed && index_backed
    }
}

/// What a pairing request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// No partner available; the requester is queued under a reserved room id.
    Waiting { room_id: RoomId },
    /// Matched with `partner`, who had been waiting.
    Paired { room: Room, partner: ClientId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Room the requester had to leave before being matched again.
    pub previous: Option<Departure>,
    pub result: MatchResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub departure: Option<Departure>,
    pub cancelled_wait: Option<WaitingEntry>,
}

impl LeaveOutcome {
    /// Whether the identity was in a room or in the queue.
    pub fn left_anything(&self) -> bool {
        self.departure.is_some() || self.cancelled_wait.is_some()
    }

    /// Partner still in the room, if any.
    pub fn remaining_partner(&self) -> Option<(&RoomId, &ClientId)> {
        self.departure.as_ref().and_then(|departure| {
            departure
                .remaining_partner
                .as_ref()
                .map(|partner| (&departure.room_id, partner))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub rooms_removed: Vec<Room>,
    pub waiting_evicted: Vec<WaitingEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LobbyCounts {
    pub total_rooms: usize,
    pub active_rooms: usize,
    pub waiting: usize,
}

/// The matchmaker: waiting queue and room store under one owner.
#[derive(Debug, Default)]
pub struct Lobby {
    queue: WaitingQueue,
    rooms: RoomStore,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `client_id` with the longest-waiting other identity, or queue it.
    ///
    /// A requester that is already waiting keeps its place and reserved room
    /// id. A requester still in a room leaves it first.
    pub fn find_or_create_room(&mut self, client_id: &ClientId, now: Timestamp) -> MatchOutcome {
        if let Some(entry) = self.queue.get(client_id) {
            return MatchOutcome {
                previous: None,
                result: MatchResult::Waiting {
                    room_id: entry.room_id.clone(),
                },
            };
        }

        let previous = self
            .rooms
            .room_of(client_id)
            .map(|room| room.id.clone())
            .and_then(|room_id| self.rooms.leave(client_id, &room_id));

        let result = match self.queue.dequeue_other_than(client_id) {
            Some(waiting) => {
                let room = self.rooms.create_pair(
                    waiting.room_id,
                    waiting.client_id.clone(),
                    client_id.clone(),
                    now,
                );
                tracing::info!(
                    "Created room {} with users: {}, {}",
                    room.id,
                    waiting.client_id,
                    client_id
                );
                MatchResult::Paired {
                    room,
                    partner: waiting.client_id,
                }
            }
            None => {
                let entry = WaitingEntry::new(client_id.clone(), now);
                let room_id = entry.room_id.clone();
                self.queue.enqueue(entry);
                tracing::info!("User {} added to waiting list, reserved room {}", client_id, room_id);
                MatchResult::Waiting { room_id }
            }
        };

        MatchOutcome { previous, result }
    }

    /// Leave whatever room the identity is in and drop any waiting entry.
    pub fn leave_current(&mut self, client_id: &ClientId) -> LeaveOutcome {
        let departure = self
            .rooms
            .room_of(client_id)
            .map(|room| room.id.clone())
            .and_then(|room_id| self.rooms.leave(client_id, &room_id));
        LeaveOutcome {
            departure,
            cancelled_wait: self.queue.remove(client_id),
        }
    }

    pub fn current_room(&self, client_id: &ClientId) -> Option<&Room> {
        self.rooms.room_of(client_id)
    }

    /// Room and partner of `client_id`, if it is in a room with someone else.
    pub fn partner_of(&self, client_id: &ClientId) -> Option<(RoomId, ClientId)> {
        let room = self.rooms.room_of(client_id)?;
        room.partner_of(client_id)
            .map(|partner| (room.id.clone(), partner.clone()))
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn is_waiting(&self, client_id: &ClientId) -> bool {
        self.queue.contains(client_id)
    }

    /// Active rooms, oldest first.
    pub fn active_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .rooms()
            .filter(|room| room.is_active)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        rooms
    }

    pub fn counts(&self) -> LobbyCounts {
        LobbyCounts {
            total_rooms: self.rooms.len(),
            active_rooms: self.rooms.active_count(),
            waiting: self.queue.len(),
        }
    }

    /// Janitor sweep: stale inactive rooms and expired waiting entries.
    pub fn sweep(&mut self, max_room_age: Duration, max_wait: Duration, now: Timestamp) -> SweepReport {
        SweepReport {
            rooms_removed: self.rooms.sweep_inactive(max_room_age, now),
            waiting_evicted: self.queue.evict_older_than(max_wait, now),
        }
    }

    /// Store invariants hold and nobody waiting is also in an active room.
    pub fn is_consistent(&self) -> bool {
        let no_waiting_in_active_room = self.queue.iter().all(|entry| {
            self.rooms
                .room_of(&entry.client_id)
                .is_none_or(|room| !room.is_active)
        });
        self.rooms.is_consistent() && no_waiting_in_active_room
    }
}
