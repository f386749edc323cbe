use anyhow::{Result, bail};
use duet_core::{ConnectionId, Notice, Relay, RoomId, ServerMessage, Signal, SignalKind};
use serde_json::{Value, json};
use std::time::Duration;

/// Timeout for a single expected server message (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// How long a client waits to be sure nothing else arrives (ms).
pub const QUIET_PERIOD_MS: u64 = 300;

pub fn offer_payload() -> Value {
    json!({
        "type": "offer",
        "sdp": "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n"
    })
}

pub fn answer_payload() -> Value {
    json!({
        "type": "answer",
        "sdp": "v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n"
    })
}

pub fn candidate_payload(n: usize) -> Value {
    json!({
        "candidate": format!("candidate:{n} 1 udp 2122260223 192.168.1.{n} 54321 typ host"),
        "sdpMid": "0",
        "sdpMLineIndex": 0
    })
}

pub fn room(name: &str) -> RoomId {
    RoomId::parse(name).expect("valid room name")
}

pub fn relay(from: ConnectionId, kind: SignalKind, payload: Value) -> ServerMessage {
    ServerMessage::from(Relay {
        from,
        signal: Signal::new(kind, payload),
    })
}

pub fn notice(notice: Notice) -> ServerMessage {
    ServerMessage::from(notice)
}

/// Polls `check` until it holds or `timeout_ms` passes.
pub async fn wait_until<F>(timeout_ms: u64, mut check: F) -> Result<()>
where
    F: AsyncFnMut() -> bool,
{
    let start = std::time::Instant::now();
    loop {
        if check().await {
            return Ok(());
        }
        if start.elapsed() > Duration::from_millis(timeout_ms) {
            bail!("Condition not met within {timeout_ms}ms");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
