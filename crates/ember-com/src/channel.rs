use crate::{ComError, WireMessage};

/// Largest message either side accepts.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024; // 64 MB

/// Bidirectional message channel to a processing endpoint.
///
/// `recv` must be cancel-safe: the viewer polls it inside `tokio::select!`
/// next to its timers.
#[allow(async_fn_in_trait)]
pub trait Channel {
    /// Send one message.
    async fn send(&mut self, message: WireMessage) -> Result<(), ComError>;

    /// Receive the next application message.
    ///
    /// Returns `ComError::ConnectionClosed` once the peer has closed.
    async fn recv(&mut self) -> Result<WireMessage, ComError>;

    /// Close the channel. Closing twice is not an error.
    async fn close(&mut self) -> Result<(), ComError>;
}

/// Opens channels on demand, e.g. each time a camera is switched on.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Channel: Channel;

    async fn connect(&self) -> Result<Self::Channel, ComError>;
}

/// Transport limits.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    max_message_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

impl ChannelConfig {
    /// Set the largest accepted inbound message, in bytes.
    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }
}
