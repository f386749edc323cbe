/// Frames queued for a connection's socket writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    /// Send a close frame and stop writing.
    Close,
}
