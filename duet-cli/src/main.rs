use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use duet::server::{ServerConfig, SignalingService, serve};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "duet")]
#[command(about = "Multi-room WebRTC signaling relay")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "DUET_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Close connections that have not joined a room after this many seconds.
    #[arg(long, env = "DUET_IDLE_TIMEOUT_SECS")]
    idle_timeout_secs: Option<u64>,

    /// Do not place new connections in the lobby; wait for a join message.
    #[arg(long, env = "DUET_NO_AUTO_LOBBY")]
    no_auto_lobby: bool,

    /// Announce departures to every client, like the single-room relay did.
    #[arg(long, env = "DUET_LEGACY_BROADCAST")]
    legacy_broadcast: bool,

    /// Capacity of the hub command queue.
    #[arg(long, env = "DUET_COMMAND_BUFFER", default_value_t = 1024)]
    command_buffer: usize,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "DUET_LOG", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            idle_timeout: self
                .idle_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            auto_lobby: !self.no_auto_lobby,
            legacy_broadcast: self.legacy_broadcast,
            command_buffer: self.command_buffer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.server_config();

    println!("{}", "📡 Starting duet signaling relay...".green().bold());
    println!("   🔌 Listening: ws://{}", config.bind);
    if let Some(timeout) = config.idle_timeout {
        println!("   ⏱  Idle timeout: {:?}", timeout);
    }
    if !config.auto_lobby {
        println!("   🚪 Auto-lobby disabled, clients must send a join");
    }
    if config.legacy_broadcast {
        println!("{}", "   ⚠  Legacy broadcast mode".yellow());
    }

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    let service = SignalingService::new(&config);

    serve(listener, service, shutdown_signal())
        .await
        .context("Signaling server failed")?;

    info!("Signaling server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
