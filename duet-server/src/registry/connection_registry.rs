use crate::transport::Transport;
use dashmap::DashMap;
use duet_core::{ConnectionId, ConnectionState, Notice, ServerMessage, SignalingError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

struct ConnectionEntry {
    transport: Box<dyn Transport>,
    state: ConnectionState,
    connected_at: Instant,
}

struct RegistryInner {
    connections: DashMap<ConnectionId, ConnectionEntry>,
}

/// Owner of every live connection's transport handle.
///
/// Cheap to clone; clones share the same table.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RegistryInner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                connections: DashMap::new(),
            }),
        }
    }

    /// Stores the transport under a fresh id and greets the connection with
    /// its id and the current connection count.
    ///
    /// If the greeting cannot be written the connection is left in
    /// `Closing` state for the caller to evict.
    pub fn register(&self, transport: Box<dyn Transport>) -> ConnectionId {
        let id = ConnectionId::new();

        self.inner.connections.insert(
            id,
            ConnectionEntry {
                transport,
                state: ConnectionState::Open,
                connected_at: Instant::now(),
            },
        );

        let client_count = self.inner.connections.len();
        info!(
            "Connection {} registered. Total connections: {}",
            id, client_count
        );

        let greeting = ServerMessage::from(Notice::Connected { id, client_count });
        if let Err(e) = self.send(&id, &greeting) {
            warn!("Could not greet {}: {}", id, e);
        }

        id
    }

    /// Releases the transport and forgets the connection. Returns `false`
    /// when the id was not registered.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        let Some((_, entry)) = self.inner.connections.remove(id) else {
            return false;
        };

        if entry.state.is_open() {
            entry.transport.close();
        }
        info!(
            "Connection {} unregistered after {:?}. Total connections: {}",
            id,
            entry.connected_at.elapsed(),
            self.inner.connections.len()
        );
        true
    }

    pub fn send(&self, id: &ConnectionId, message: &ServerMessage) -> Result<(), SignalingError> {
        let json = encode(message)?;

        let Some(mut entry) = self.inner.connections.get_mut(id) else {
            return Err(SignalingError::ConnectionClosed(*id));
        };

        if !entry.state.is_open() {
            return Err(SignalingError::ConnectionClosed(*id));
        }

        if entry.transport.send_text(json).is_err() {
            entry.state = ConnectionState::Closing;
            return Err(SignalingError::ConnectionClosed(*id));
        }

        Ok(())
    }

    /// Sends to every open connection except `exclude` and returns the ones
    /// whose transport turned out to be dead.
    pub fn broadcast_except(
        &self,
        exclude: &ConnectionId,
        message: &ServerMessage,
    ) -> Vec<ConnectionId> {
        let Ok(json) = encode(message) else {
            return Vec::new();
        };

        let mut unreachable = Vec::new();
        let mut delivered = 0usize;

        for mut entry in self.inner.connections.iter_mut() {
            if entry.key() == exclude || !entry.state.is_open() {
                continue;
            }

            if entry.transport.send_text(json.clone()).is_ok() {
                delivered += 1;
            } else {
                entry.state = ConnectionState::Closing;
                unreachable.push(*entry.key());
            }
        }

        debug!("Broadcast delivered to {} connection(s)", delivered);
        unreachable
    }

    /// Starts a server-initiated close. The entry stays until `unregister`.
    pub fn close(&self, id: &ConnectionId) {
        if let Some(mut entry) = self.inner.connections.get_mut(id) {
            entry.state = ConnectionState::Closing;
            entry.transport.close();
        }
    }

    /// Unknown ids report `Closed`.
    pub fn state(&self, id: &ConnectionId) -> ConnectionState {
        self.inner
            .connections
            .get(id)
            .map(|entry| entry.state)
            .unwrap_or(ConnectionState::Closed)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(message: &ServerMessage) -> Result<String, SignalingError> {
    message.to_json().map_err(|e| {
        error!("Failed to serialize outbound message: {}", e);
        SignalingError::MalformedEnvelope(e.to_string())
    })
}
