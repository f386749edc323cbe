use crate::error::SignalingError;
use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// The three relayed envelope kinds. Each one is a top-level key on the wire:
/// `{"offer": ...}`, `{"answer": ...}`, `{"candidate": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [SignalKind::Offer, SignalKind::Answer, SignalKind::Candidate];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::Candidate => "candidate",
        }
    }
}

/// A relayed envelope. The payload is opaque and forwarded untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub payload: Value,
}

impl Signal {
    pub fn new(kind: SignalKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    /// Pulls the first signal key out of a JSON object, dropping everything else.
    fn take_from(fields: &mut Map<String, Value>) -> Option<Self> {
        SignalKind::ALL.into_iter().find_map(|kind| {
            fields
                .remove(kind.as_str())
                .map(|payload| Signal::new(kind, payload))
        })
    }
}

/// Messages a client may send over its socket.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// `{"type":"join","room"?:string}`. No room means the lobby.
    Join { room: Option<RoomId> },
    /// `{"type":"leave"}`
    Leave,
    Signal(Signal),
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, SignalingError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SignalingError::MalformedEnvelope(e.to_string()))?;

        let Value::Object(mut fields) = value else {
            return Err(SignalingError::MalformedEnvelope(
                "expected a JSON object".to_owned(),
            ));
        };

        let tag = fields
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match tag.as_deref() {
            Some("join") => return Self::parse_join(fields.remove("room")),
            Some("leave") => return Ok(ClientMessage::Leave),
            _ => {}
        }

        Signal::take_from(&mut fields)
            .map(ClientMessage::Signal)
            .ok_or_else(|| {
                SignalingError::MalformedEnvelope("no recognised message shape".to_owned())
            })
    }

    fn parse_join(room: Option<Value>) -> Result<Self, SignalingError> {
        let room = match room {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) if raw.trim().is_empty() => None,
            Some(Value::String(raw)) => Some(RoomId::parse(&raw).ok_or_else(|| {
                SignalingError::MalformedEnvelope("room identifier too long".to_owned())
            })?),
            Some(other) => {
                return Err(SignalingError::MalformedEnvelope(format!(
                    "room must be a string, got {other}"
                )));
            }
        };
        Ok(ClientMessage::Join { room })
    }
}

/// Error codes carried by `{"type":"error"}` notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RoomFull,
    NoPeer,
}

/// Control messages generated by the server itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notice {
    Connected {
        id: ConnectionId,
        #[serde(rename = "clientCount")]
        client_count: usize,
    },
    Joined {
        room: RoomId,
        members: usize,
    },
    PeerJoined {
        room: RoomId,
        peer: ConnectionId,
    },
    PeerLeft {
        room: RoomId,
        peer: ConnectionId,
    },
    /// Process-wide departure notice of the single-room compatibility mode.
    PeerDisconnected,
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl Notice {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Notice::Error {
            code,
            message: message.into(),
        }
    }
}

/// A signal on its way to the peer, stamped with the server-known sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Relay {
    pub from: ConnectionId,
    pub signal: Signal,
}

impl Serialize for Relay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.signal.kind.as_str(), &self.signal.payload)?;
        map.serialize_entry("from", &self.from)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Notice(Notice),
    Relay(Relay),
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Client-side decoding of an outbound frame.
    pub fn parse(text: &str) -> Result<Self, SignalingError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SignalingError::MalformedEnvelope(e.to_string()))?;

        let Value::Object(mut fields) = value else {
            return Err(SignalingError::MalformedEnvelope(
                "expected a JSON object".to_owned(),
            ));
        };

        if fields.contains_key("type") {
            return serde_json::from_value(Value::Object(fields))
                .map(ServerMessage::Notice)
                .map_err(|e| SignalingError::MalformedEnvelope(e.to_string()));
        }

        let from = fields
            .remove("from")
            .and_then(|v| serde_json::from_value::<ConnectionId>(v).ok())
            .ok_or_else(|| SignalingError::MalformedEnvelope("relay without sender".to_owned()))?;
        let signal = Signal::take_from(&mut fields)
            .ok_or_else(|| SignalingError::MalformedEnvelope("relay without signal".to_owned()))?;

        Ok(ServerMessage::Relay(Relay { from, signal }))
    }
}

impl From<Notice> for ServerMessage {
    fn from(notice: Notice) -> Self {
        ServerMessage::Notice(notice)
    }
}

impl From<Relay> for ServerMessage {
    fn from(relay: Relay) -> Self {
        ServerMessage::Relay(relay)
    }
}
