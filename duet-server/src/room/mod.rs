mod room;
mod room_event;
mod room_manager;

pub use room::*;
pub use room_event::*;
pub use room_manager::*;
