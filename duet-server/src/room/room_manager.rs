use crate::room::{JoinOutcome, Room, RoomEvent};
use duet_core::{ConnectionId, RoomId, SignalingError};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, error, info};

/// Maps connections to rooms.
///
/// Not synchronized: it is owned by the hub task, which applies every join
/// and leave in order. That is what keeps each room at two members or fewer.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<ConnectionId, RoomId>,
    /// Exactly the lobby rooms with a single waiting member, oldest first.
    lobby_waiting: VecDeque<RoomId>,
    lobby_seq: u64,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `conn` in `requested`, or pairs it through the lobby when no
    /// room is named. A connection already in another room leaves it first,
    /// unless the target is full, in which case nothing changes.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        requested: Option<RoomId>,
    ) -> Result<JoinOutcome, SignalingError> {
        if let Some(current) = self.memberships.get(&conn) {
            let stays = match &requested {
                Some(id) => id == current,
                None => self.rooms.get(current).is_some_and(Room::is_lobby),
            };
            if stays {
                return Ok(JoinOutcome {
                    room: current.clone(),
                    events: Vec::new(),
                });
            }
        }

        let (target, lobby) = match requested {
            Some(id) => (id, false),
            None => (self.open_lobby_room(), true),
        };

        if self.rooms.get(&target).is_some_and(Room::is_full) {
            debug!("Connection {} rejected: room {} is full", conn, target);
            return Err(SignalingError::RoomFull(target));
        }

        let mut events = self.leave(&conn);

        let room = self.rooms.entry(target.clone()).or_insert_with(|| {
            info!("Creating new room: {}", target);
            Room::new(target.clone(), lobby)
        });
        room.admit(conn);
        self.memberships.insert(conn, target.clone());

        events.push(RoomEvent::Joined {
            room: target.clone(),
            member: conn,
            members: room.len(),
        });

        match room.members() {
            [first, second] => {
                if room.is_lobby() {
                    self.lobby_waiting.retain(|id| id != &target);
                }
                events.push(RoomEvent::PeerJoined {
                    room: target.clone(),
                    members: [*first, *second],
                });
            }
            _ if room.is_lobby() => enqueue_waiting(&mut self.lobby_waiting, &target),
            _ => {}
        }

        info!("Connection {} joined room {}", conn, target);
        Ok(JoinOutcome {
            room: target,
            events,
        })
    }

    /// Removes `conn` from its room. The last member out deletes the room;
    /// otherwise the remaining member is reported. No-op for connections
    /// that are not in a room.
    pub fn leave(&mut self, conn: &ConnectionId) -> Vec<RoomEvent> {
        let Some(room_id) = self.memberships.remove(conn) else {
            return Vec::new();
        };

        let Some(room) = self.rooms.get_mut(&room_id) else {
            error!("Connection {} pointed at missing room {}", conn, room_id);
            return Vec::new();
        };

        room.remove(conn);
        info!("Connection {} left room {}", conn, room_id);

        match room.members().first().copied() {
            None => {
                if room.is_lobby() {
                    self.lobby_waiting.retain(|id| id != &room_id);
                }
                self.rooms.remove(&room_id);
                info!("Room {} is empty, removing it", room_id);
                vec![RoomEvent::RoomClosed { room: room_id }]
            }
            Some(remaining) => {
                if room.is_lobby() {
                    enqueue_waiting(&mut self.lobby_waiting, &room_id);
                }
                vec![RoomEvent::PeerLeft {
                    room: room_id,
                    departed: *conn,
                    remaining,
                }]
            }
        }
    }

    pub fn peer_of(&self, conn: &ConnectionId) -> Option<ConnectionId> {
        let room_id = self.memberships.get(conn)?;
        self.rooms.get(room_id)?.peer_of(conn)
    }

    pub fn room_of(&self, conn: &ConnectionId) -> Option<&RoomId> {
        self.memberships.get(conn)
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Connections sitting alone in a lobby room.
    pub fn waiting_in_lobby(&self) -> usize {
        self.rooms
            .values()
            .filter(|room| room.is_lobby() && room.len() == 1)
            .count()
    }

    /// Takes the oldest lobby room with one waiting member off the queue,
    /// or names a fresh lobby room.
    fn open_lobby_room(&mut self) -> RoomId {
        while let Some(candidate) = self.lobby_waiting.pop_front() {
            let waiting = self
                .rooms
                .get(&candidate)
                .is_some_and(|room| room.is_lobby() && room.len() == 1);
            if waiting {
                return candidate;
            }
        }

        loop {
            self.lobby_seq += 1;
            let id = RoomId::lobby(self.lobby_seq);
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Moves `room` to the back of the waiting line.
fn enqueue_waiting(queue: &mut VecDeque<RoomId>, room: &RoomId) {
    queue.retain(|id| id != room);
    queue.push_back(room.clone());
}
