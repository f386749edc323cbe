mod channel_transport;
mod outbound_frame;

pub use channel_transport::*;
pub use outbound_frame::*;
