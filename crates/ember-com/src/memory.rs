use crate::{Channel, ComError, Connector, WireMessage};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// One end of an in-process channel pair.
///
/// Dropping or closing one end makes `recv` on the other end return
/// `ComError::ConnectionClosed` once buffered messages are drained.
pub struct MemoryChannel {
    tx: Option<mpsc::UnboundedSender<WireMessage>>,
    rx: mpsc::UnboundedReceiver<WireMessage>,
}

impl MemoryChannel {
    /// Create two connected ends.
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            MemoryChannel {
                tx: Some(a_tx),
                rx: a_rx,
            },
            MemoryChannel {
                tx: Some(b_tx),
                rx: b_rx,
            },
        )
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(|tx| tx.is_closed())
    }
}

impl Channel for MemoryChannel {
    async fn send(&mut self, message: WireMessage) -> Result<(), ComError> {
        let tx = self.tx.as_ref().ok_or(ComError::ConnectionClosed)?;
        tx.send(message).map_err(|_| ComError::ConnectionClosed)
    }

    async fn recv(&mut self) -> Result<WireMessage, ComError> {
        self.rx.recv().await.ok_or(ComError::ConnectionClosed)
    }

    async fn close(&mut self) -> Result<(), ComError> {
        self.tx = None;
        self.rx.close();
        Ok(())
    }
}

/// Hands out pre-built channel ends, one per `connect`.
///
/// Fails with `ConnectionClosed` when no prepared end is left.
pub struct MemoryConnector {
    pending: Mutex<Vec<MemoryChannel>>,
}

impl MemoryConnector {
    pub fn new(channels: Vec<MemoryChannel>) -> Self {
        let mut pending = channels;
        pending.reverse();
        Self {
            pending: Mutex::new(pending),
        }
    }
}

impl Connector for MemoryConnector {
    type Channel = MemoryChannel;

    async fn connect(&self) -> Result<MemoryChannel, ComError> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .ok_or(ComError::ConnectionClosed)
    }
}
