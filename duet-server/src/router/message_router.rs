use crate::registry::ConnectionRegistry;
use crate::room::RoomManager;
use duet_core::{ConnectionId, ErrorCode, Notice, Relay, ServerMessage, Signal, SignalingError};
use tracing::{debug, warn};

/// Forwards signals to the other member of the sender's room.
///
/// Payloads are never inspected. The only thing added on the way is the
/// sender id, taken from the connection the signal arrived on.
#[derive(Clone)]
pub struct MessageRouter {
    registry: ConnectionRegistry,
}

impl MessageRouter {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Returns the peer the signal was delivered to.
    ///
    /// Without a peer the sender gets a `no-peer` error and the signal is
    /// dropped (`NoPeer`). `ConnectionClosed` names whichever side could
    /// not be written to.
    pub fn route(
        &self,
        rooms: &RoomManager,
        sender: ConnectionId,
        signal: Signal,
    ) -> Result<ConnectionId, SignalingError> {
        let kind = signal.kind.as_str();

        let Some(peer) = rooms.peer_of(&sender) else {
            debug!("No peer for {}, dropping {}", sender, kind);
            let notice = Notice::error(ErrorCode::NoPeer, format!("no peer to receive {kind}"));
            self.registry
                .send(&sender, &ServerMessage::from(notice))
                .inspect_err(|e| warn!("Could not report missing peer to {}: {}", sender, e))?;
            return Err(SignalingError::NoPeer(sender));
        };

        let relay = ServerMessage::from(Relay {
            from: sender,
            signal,
        });
        self.registry
            .send(&peer, &relay)
            .inspect_err(|e| warn!("Failed to relay {} from {}: {}", kind, sender, e))?;

        debug!("Relayed {} from {} to {}", kind, sender, peer);
        Ok(peer)
    }
}
