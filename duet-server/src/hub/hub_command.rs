use crate::transport::Transport;
use duet_core::{ClientMessage, ConnectionId, RoomId};
use serde::Serialize;
use tokio::sync::oneshot;

/// Commands processed, one at a time, by the hub task.
pub enum HubCommand {
    /// A socket was accepted. `room` is joined right after registering.
    Connect {
        transport: Box<dyn Transport>,
        room: Option<RoomId>,
        reply: oneshot::Sender<ConnectionId>,
    },

    /// A parsed message from a client.
    Inbound {
        id: ConnectionId,
        message: ClientMessage,
    },

    /// The socket closed or errored.
    Disconnect { id: ConnectionId },

    /// Idle-timeout timer fired for this connection.
    IdleCheck { id: ConnectionId },

    Stats { reply: oneshot::Sender<HubStats> },
}

/// Snapshot served by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub connections: usize,
    pub rooms: usize,
    /// Connections alone in a lobby room.
    pub waiting: usize,
}
