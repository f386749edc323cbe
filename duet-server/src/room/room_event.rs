use duet_core::{ConnectionId, RoomId};

/// Membership changes reported by the room manager, consumed by the
/// lifecycle notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// `member` entered `room`, which now has `members` members.
    Joined {
        room: RoomId,
        member: ConnectionId,
        members: usize,
    },
    /// The room just became a pair.
    PeerJoined {
        room: RoomId,
        members: [ConnectionId; 2],
    },
    PeerLeft {
        room: RoomId,
        departed: ConnectionId,
        remaining: ConnectionId,
    },
    /// The last member left and the room was deleted.
    RoomClosed { room: RoomId },
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room: RoomId,
    /// Includes the events of leaving a previous room, in order.
    pub events: Vec<RoomEvent>,
}
