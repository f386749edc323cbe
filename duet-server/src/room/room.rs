use duet_core::{ConnectionId, RoomId};
use std::time::Instant;

/// Members allowed in one room.
pub const ROOM_CAPACITY: usize = 2;

/// A signaling session between at most two connections. Members are kept in
/// arrival order and referenced by id only.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: Vec<ConnectionId>,
    created_at: Instant,
    lobby: bool,
}

impl Room {
    pub(crate) fn new(id: RoomId, lobby: bool) -> Self {
        Self {
            id,
            members: Vec::with_capacity(ROOM_CAPACITY),
            created_at: Instant::now(),
            lobby,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    /// Whether the room was opened for arrival-order pairing.
    pub fn is_lobby(&self) -> bool {
        self.lobby
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn contains(&self, conn: &ConnectionId) -> bool {
        self.members.contains(conn)
    }

    /// The other member, if `conn` is in this room and is not alone.
    pub fn peer_of(&self, conn: &ConnectionId) -> Option<ConnectionId> {
        if !self.contains(conn) {
            return None;
        }
        self.members.iter().find(|m| *m != conn).copied()
    }

    pub(crate) fn admit(&mut self, conn: ConnectionId) -> bool {
        if self.is_full() || self.contains(&conn) {
            return false;
        }
        self.members.push(conn);
        true
    }

    pub(crate) fn remove(&mut self, conn: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != conn);
        self.members.len() != before
    }
}
