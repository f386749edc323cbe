mod health;
mod signaling_service;
mod ws_handler;

pub use health::*;
pub use signaling_service::*;
pub use ws_handler::*;
