use crate::registry::ConnectionRegistry;
use crate::room::RoomEvent;
use duet_core::{ConnectionId, ErrorCode, Notice, RoomId, ServerMessage};
use tracing::{debug, warn};

/// How departures are announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeMode {
    /// `peer-left` to the remaining room member only.
    #[default]
    Room,
    /// `peer-disconnected` to every other connection when a transport
    /// closes.
    LegacyBroadcast,
}

/// Turns room events into control messages for the connections they affect.
///
/// Every method returns the recipients whose transport was found dead so
/// the caller can evict them.
#[derive(Clone)]
pub struct LifecycleNotifier {
    registry: ConnectionRegistry,
    mode: NoticeMode,
}

impl LifecycleNotifier {
    pub fn new(registry: ConnectionRegistry, mode: NoticeMode) -> Self {
        Self { registry, mode }
    }

    pub fn dispatch(&self, events: &[RoomEvent]) -> Vec<ConnectionId> {
        let mut unreachable = Vec::new();
        for event in events {
            unreachable.extend(self.dispatch_one(event));
        }
        unreachable
    }

    /// Announces a closed transport. In legacy mode the room-scoped
    /// `peer-left` is replaced by a process-wide `peer-disconnected`.
    pub fn on_disconnect(&self, departed: ConnectionId, events: &[RoomEvent]) -> Vec<ConnectionId> {
        match self.mode {
            NoticeMode::Room => self.dispatch(events),
            NoticeMode::LegacyBroadcast => {
                let mut unreachable: Vec<ConnectionId> = events
                    .iter()
                    .filter(|event| !matches!(event, RoomEvent::PeerLeft { .. }))
                    .flat_map(|event| self.dispatch_one(event))
                    .collect();
                let notice = ServerMessage::from(Notice::PeerDisconnected);
                unreachable.extend(self.registry.broadcast_except(&departed, &notice));
                unreachable
            }
        }
    }

    pub fn on_join(&self, room: &RoomId, member: ConnectionId, members: usize) -> Vec<ConnectionId> {
        let notice = Notice::Joined {
            room: room.clone(),
            members,
        };
        self.deliver(member, notice).into_iter().collect()
    }

    pub fn on_peer_join(&self, room: &RoomId, members: [ConnectionId; 2]) -> Vec<ConnectionId> {
        let [first, second] = members;
        [(first, second), (second, first)]
            .into_iter()
            .filter_map(|(to, peer)| {
                self.deliver(
                    to,
                    Notice::PeerJoined {
                        room: room.clone(),
                        peer,
                    },
                )
            })
            .collect()
    }

    pub fn on_leave(
        &self,
        room: &RoomId,
        departed: ConnectionId,
        remaining: ConnectionId,
    ) -> Vec<ConnectionId> {
        let notice = Notice::PeerLeft {
            room: room.clone(),
            peer: departed,
        };
        self.deliver(remaining, notice).into_iter().collect()
    }

    pub fn on_room_full(&self, conn: ConnectionId, room: &RoomId) -> Vec<ConnectionId> {
        let notice = Notice::error(ErrorCode::RoomFull, format!("room {room} is full"));
        self.deliver(conn, notice).into_iter().collect()
    }

    fn dispatch_one(&self, event: &RoomEvent) -> Vec<ConnectionId> {
        match event {
            RoomEvent::Joined {
                room,
                member,
                members,
            } => self.on_join(room, *member, *members),
            RoomEvent::PeerJoined { room, members } => self.on_peer_join(room, *members),
            RoomEvent::PeerLeft {
                room,
                departed,
                remaining,
            } => self.on_leave(room, *departed, *remaining),
            RoomEvent::RoomClosed { room } => {
                debug!("Room {} closed", room);
                Vec::new()
            }
        }
    }

    /// Sends one notice; yields the recipient back if it is unreachable.
    fn deliver(&self, to: ConnectionId, notice: Notice) -> Option<ConnectionId> {
        match self.registry.send(&to, &ServerMessage::from(notice)) {
            Ok(()) => None,
            Err(e) => {
                warn!("Dropping notice for {}: {}", to, e);
                Some(to)
            }
        }
    }
}
