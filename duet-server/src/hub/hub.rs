use crate::config::ServerConfig;
use crate::hub::{HubCommand, HubHandle, HubStats};
use crate::notifier::LifecycleNotifier;
use crate::registry::ConnectionRegistry;
use crate::room::RoomManager;
use crate::router::MessageRouter;
use crate::transport::Transport;
use duet_core::{ClientMessage, ConnectionId, RoomId, Signal, SignalingError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Single owner of room state.
///
/// Every connect, join, leave, route and disconnect goes through one hub in
/// arrival order, so room mutations never race. The sync methods are the
/// whole behavior; `run` only feeds them from the command queue.
pub struct Hub {
    registry: ConnectionRegistry,
    rooms: RoomManager,
    router: MessageRouter,
    notifier: LifecycleNotifier,
    auto_lobby: bool,
    idle_timeout: Option<Duration>,
    timer_tx: Option<mpsc::WeakSender<HubCommand>>,
}

impl Hub {
    pub fn new(registry: ConnectionRegistry, config: &ServerConfig) -> Self {
        Self {
            router: MessageRouter::new(registry.clone()),
            notifier: LifecycleNotifier::new(registry.clone(), config.notice_mode()),
            registry,
            rooms: RoomManager::new(),
            auto_lobby: config.auto_lobby,
            idle_timeout: config.idle_timeout,
            timer_tx: None,
        }
    }

    /// Starts a hub task and returns the handle used to feed it. The task
    /// ends once every handle is dropped.
    pub fn spawn(registry: ConnectionRegistry, config: &ServerConfig) -> HubHandle {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));

        let mut hub = Hub::new(registry, config);
        hub.timer_tx = Some(command_tx.downgrade());
        tokio::spawn(hub.run(command_rx));

        HubHandle::new(command_tx)
    }

    pub async fn run(mut self, mut command_rx: mpsc::Receiver<HubCommand>) {
        info!("Hub event loop started");

        while let Some(cmd) = command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!("Command channel closed. Hub event loop finished");
    }

    pub fn handle_command(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Connect {
                transport,
                room,
                reply,
            } => {
                let id = self.connect(transport, room);
                if reply.send(id).is_err() {
                    // The socket handler is gone before it learned its id.
                    self.disconnect(id);
                }
            }

            HubCommand::Inbound { id, message } => self.handle_message(id, message),

            HubCommand::Disconnect { id } => self.disconnect(id),

            HubCommand::IdleCheck { id } => self.expire_idle(id),

            HubCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    /// Registers the transport, then joins `room`, or the lobby when
    /// auto-lobby is on.
    pub fn connect(&mut self, transport: Box<dyn Transport>, room: Option<RoomId>) -> ConnectionId {
        let id = self.registry.register(transport);

        if !self.registry.state(&id).is_open() {
            self.evict(vec![id]);
            return id;
        }

        self.schedule_idle_check(id);

        if (room.is_some() || self.auto_lobby)
            && let Err(e) = self.join(id, room)
        {
            debug!("Connection {} left unassigned: {}", id, e);
        }

        id
    }

    /// Applies a client message. Messages from connections that are no
    /// longer registered are ignored.
    pub fn handle_message(&mut self, id: ConnectionId, message: ClientMessage) {
        if !self.registry.contains(&id) {
            debug!("Ignoring message from unregistered connection {}", id);
            return;
        }

        match message {
            ClientMessage::Join { room } => {
                if let Err(e) = self.join(id, room) {
                    debug!("Join from {} not applied: {}", id, e);
                }
            }
            ClientMessage::Leave => self.leave(id),
            ClientMessage::Signal(signal) => {
                if let Err(e) = self.route(id, signal) {
                    debug!("Signal from {} not delivered: {}", id, e);
                }
            }
        }
    }

    pub fn join(&mut self, id: ConnectionId, room: Option<RoomId>) -> Result<RoomId, SignalingError> {
        match self.rooms.join(id, room) {
            Ok(outcome) => {
                let unreachable = self.notifier.dispatch(&outcome.events);
                self.evict(unreachable);
                Ok(outcome.room)
            }
            Err(SignalingError::RoomFull(room)) => {
                info!("Connection {} rejected: room {} is full", id, room);
                let unreachable = self.notifier.on_room_full(id, &room);
                self.evict(unreachable);
                Err(SignalingError::RoomFull(room))
            }
            Err(e) => Err(e),
        }
    }

    pub fn leave(&mut self, id: ConnectionId) {
        let events = self.rooms.leave(&id);
        let unreachable = self.notifier.dispatch(&events);
        self.evict(unreachable);
    }

    pub fn route(&mut self, id: ConnectionId, signal: Signal) -> Result<ConnectionId, SignalingError> {
        let result = self.router.route(&self.rooms, id, signal);
        if let Err(SignalingError::ConnectionClosed(dead)) = &result {
            self.evict(vec![*dead]);
        }
        result
    }

    /// Unregisters the connection, removes it from its room and tells
    /// whoever is affected. Idempotent.
    pub fn disconnect(&mut self, id: ConnectionId) {
        let mut pending = self.drop_connection(id);
        while let Some(dead) = pending.pop() {
            warn!("Evicting unreachable connection {}", dead);
            pending.extend(self.drop_connection(dead));
        }
    }

    /// Closes the connection if it still has no room.
    pub fn expire_idle(&mut self, id: ConnectionId) {
        if !self.registry.contains(&id) || self.rooms.room_of(&id).is_some() {
            return;
        }

        info!("Closing idle connection {}", id);
        self.registry.close(&id);
        self.disconnect(id);
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            connections: self.registry.len(),
            rooms: self.rooms.len(),
            waiting: self.rooms.waiting_in_lobby(),
        }
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    fn evict(&mut self, unreachable: Vec<ConnectionId>) {
        for id in unreachable {
            warn!("Evicting unreachable connection {}", id);
            self.disconnect(id);
        }
    }

    /// Returns recipients found dead while announcing the departure.
    fn drop_connection(&mut self, id: ConnectionId) -> Vec<ConnectionId> {
        let was_registered = self.registry.unregister(&id);
        let events = self.rooms.leave(&id);

        if !was_registered && events.is_empty() {
            return Vec::new();
        }

        info!("Connection {} disconnected", id);
        self.notifier.on_disconnect(id, &events)
    }

    fn schedule_idle_check(&self, id: ConnectionId) {
        let (Some(timeout), Some(timer_tx)) = (self.idle_timeout, self.timer_tx.clone()) else {
            return;
        };

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(command_tx) = timer_tx.upgrade() {
                let _ = command_tx.send(HubCommand::IdleCheck { id }).await;
            }
        });
    }
}
