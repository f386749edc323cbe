
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::Level;

use duet_core::{ConnectionId, Notice, RoomId, ServerMessage};
use duet_server::{ConnectionRegistry, Hub, ServerConfig, SignalingService, serve};

use crate::utils::{RecordingTransport, TestClient, notice};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Config where connections stay unassigned until they ask for a room.
pub fn explicit_rooms() -> ServerConfig {
    ServerConfig {
        auto_lobby: false,
        ..ServerConfig::default()
    }
}

/// A hub driven directly, without a task or sockets.
pub fn create_test_hub(config: ServerConfig) -> Hub {
    Hub::new(ConnectionRegistry::new(), &config)
}

/// Registers a recording transport, optionally straight into `room`.
pub fn connect_peer(hub: &mut Hub, room: Option<&str>) -> (ConnectionId, RecordingTransport) {
    let transport = RecordingTransport::new();
    let room = room.map(|name| RoomId::parse(name).expect("valid room name"));
    let id = hub.connect(Box::new(transport.clone()), room);
    (id, transport)
}

/// Serves a fresh signaling service on an ephemeral local port.
pub async fn spawn_test_server(config: ServerConfig) -> Result<(SocketAddr, SignalingService)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind test listener")?;
    let addr = listener.local_addr()?;

    let service = SignalingService::new(&config);
    tokio::spawn(serve(listener, service.clone(), std::future::pending()));

    Ok((addr, service))
}

/// Connects two websocket clients to `/ws/{room}` and consumes their
/// `joined` and `peer-joined` notices.
pub async fn connect_pair(addr: SocketAddr, room: &str) -> Result<(TestClient, TestClient)> {
    let path = format!("/ws/{room}");
    let room = RoomId::parse(room).context("invalid room name")?;

    let mut first = TestClient::connect(addr, &path).await?;
    expect_notice(
        &mut first,
        Notice::Joined {
            room: room.clone(),
            members: 1,
        },
    )
    .await?;

    let mut second = TestClient::connect(addr, &path).await?;
    expect_notice(
        &mut second,
        Notice::Joined {
            room: room.clone(),
            members: 2,
        },
    )
    .await?;

    let (first_id, second_id) = (first.id, second.id);
    expect_notice(
        &mut first,
        Notice::PeerJoined {
            room: room.clone(),
            peer: second_id,
        },
    )
    .await?;
    expect_notice(
        &mut second,
        Notice::PeerJoined {
            room,
            peer: first_id,
        },
    )
    .await?;

    Ok((first, second))
}

async fn expect_notice(client: &mut TestClient, expected: Notice) -> Result<()> {
    let got: ServerMessage = client.recv().await?;
    anyhow::ensure!(got == notice(expected.clone()), "Expected {expected:?}, got {got:?}");
    Ok(())
}
