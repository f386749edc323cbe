mod connection;
mod room;
mod signaling;

pub use connection::{ConnectionId, ConnectionState};
pub use room::{LOBBY_ROOM, MAX_ROOM_ID_LEN, RoomId};
pub use signaling::{ClientMessage, ErrorCode, Notice, Relay, ServerMessage, Signal, SignalKind};
