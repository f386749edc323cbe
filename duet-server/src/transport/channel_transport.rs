use crate::transport::OutboundFrame;
use tokio::sync::mpsc;

/// Write side of one client connection, as seen by the registry.
///
/// Implementations must not block: the hub calls these from its event loop.
pub trait Transport: Send + Sync {
    /// Queues a text frame. `Err` means the socket is gone.
    fn send_text(&self, text: String) -> Result<(), TransportClosed>;

    /// Asks the socket writer to send a close frame and stop.
    fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportClosed;

/// Transport backed by the unbounded queue drained by a socket writer task.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<OutboundFrame>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::UnboundedSender<OutboundFrame>) -> Self {
        Self { tx }
    }

    /// Creates a transport together with the receiving end of its queue.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Transport for ChannelTransport {
    fn send_text(&self, text: String) -> Result<(), TransportClosed> {
        self.tx
            .send(OutboundFrame::Text(text))
            .map_err(|_| TransportClosed)
    }

    fn close(&self) {
        let _ = self.tx.send(OutboundFrame::Close);
    }
}
