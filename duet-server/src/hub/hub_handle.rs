use crate::hub::{HubCommand, HubStats};
use crate::transport::Transport;
use duet_core::{ClientMessage, ConnectionId, RoomId, SignalingError};
use tokio::sync::{mpsc, oneshot};
use tracing::error;

/// Cloneable sender side of a running hub.
#[derive(Clone)]
pub struct HubHandle {
    command_tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<HubCommand>) -> Self {
        Self { command_tx }
    }

    /// Registers a transport and waits for its id.
    pub async fn connect(
        &self,
        transport: Box<dyn Transport>,
        room: Option<RoomId>,
    ) -> Result<ConnectionId, SignalingError> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(HubCommand::Connect {
            transport,
            room,
            reply,
        })
        .await?;
        reply_rx.await.map_err(|_| SignalingError::HubUnavailable)
    }

    pub async fn dispatch(&self, id: ConnectionId, message: ClientMessage) -> Result<(), SignalingError> {
        self.send(HubCommand::Inbound { id, message }).await
    }

    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), SignalingError> {
        self.send(HubCommand::Disconnect { id }).await
    }

    pub async fn stats(&self) -> Result<HubStats, SignalingError> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(HubCommand::Stats { reply }).await?;
        reply_rx.await.map_err(|_| SignalingError::HubUnavailable)
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), SignalingError> {
        self.command_tx.send(cmd).await.map_err(|_| {
            error!("Hub died");
            SignalingError::HubUnavailable
        })
    }
}
