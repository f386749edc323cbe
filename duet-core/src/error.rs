use crate::model::{ConnectionId, RoomId};
use thiserror::Error;

/// Failures of the signaling relay. None of them is fatal to the process;
/// each is contained to the connection it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalingError {
    /// Write to a connection that is not open. Recovered by evicting it.
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),
    #[error("room {0} is full")]
    RoomFull(RoomId),
    #[error("connection {0} has no peer")]
    NoPeer(ConnectionId),
    /// Unparseable input. Dropped without telling the client.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("signaling hub is not running")]
    HubUnavailable,
}
