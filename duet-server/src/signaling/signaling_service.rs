use crate::config::ServerConfig;
use crate::hub::{Hub, HubHandle, HubStats};
use crate::registry::ConnectionRegistry;
use crate::signaling::{health_handler, ws_handler, ws_room_handler};
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

struct SignalingInner {
    hub: HubHandle,
}

/// Shared state of the HTTP surface: the hub handle that every socket
/// handler feeds.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    /// Spawns the hub. Must be called inside a tokio runtime.
    pub fn new(config: &ServerConfig) -> Self {
        let hub = Hub::spawn(ConnectionRegistry::new(), config);

        Self {
            inner: Arc::new(SignalingInner { hub }),
        }
    }

    pub fn hub(&self) -> &HubHandle {
        &self.inner.hub
    }

    pub async fn stats(&self) -> Option<HubStats> {
        self.inner.hub.stats().await.ok()
    }

    /// `/` and `/ws` accept sockets, `/ws/{room}` joins `room` on connect,
    /// `/health` reports counts.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(ws_handler))
            .route("/ws", get(ws_handler))
            .route("/ws/{room}", get(ws_room_handler))
            .route("/health", get(health_handler))
            .with_state(self.clone())
    }
}

/// Serves `service` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, service: SignalingService, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Signaling server listening on ws://{}", addr);

    axum::serve(listener, service.router())
        .with_graceful_shutdown(shutdown)
        .await
}
