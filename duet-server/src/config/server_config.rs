use crate::notifier::NoticeMode;
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime settings of the signaling server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub bind: SocketAddr,
    /// Close connections that are still outside any room after this long.
    /// `None` disables the policy.
    pub idle_timeout: Option<Duration>,
    /// Put every new connection without an explicit room in the lobby.
    pub auto_lobby: bool,
    /// Announce departures with a process-wide `peer-disconnected`.
    pub legacy_broadcast: bool,
    /// Capacity of the hub command queue.
    pub command_buffer: usize,
}

impl ServerConfig {
    pub fn notice_mode(&self) -> NoticeMode {
        if self.legacy_broadcast {
            NoticeMode::LegacyBroadcast
        } else {
            NoticeMode::Room
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            idle_timeout: None,
            auto_lobby: true,
            legacy_broadcast: false,
            command_buffer: 1024,
        }
    }
}
