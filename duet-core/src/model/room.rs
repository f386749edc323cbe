use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest room identifier a client may request.
pub const MAX_ROOM_ID_LEN: usize = 128;

/// Name of the first lobby room. Later lobby rooms are `lobby-2`, `lobby-3`, ...
pub const LOBBY_ROOM: &str = "lobby";

/// Room identifier, either chosen by a client or generated for the lobby.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Validates a client supplied identifier. Surrounding whitespace is
    /// trimmed; empty or oversized names are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_ROOM_ID_LEN {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Identifier of the `seq`-th lobby room (1-based).
    pub fn lobby(seq: u64) -> Self {
        if seq <= 1 {
            Self(LOBBY_ROOM.to_owned())
        } else {
            Self(format!("{LOBBY_ROOM}-{seq}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
