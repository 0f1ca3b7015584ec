//! Message channels between the viewer and the processing backend.
//!
//! [`Channel`] is the seam: the viewer is written against it, the WebSocket
//! transport implements it for real connections and [`MemoryChannel`]
//! implements it in-process.

pub mod channel;
pub mod error;
pub mod memory;
pub mod message;
pub mod ws;

pub use channel::{Channel, ChannelConfig, Connector};
pub use error::ComError;
pub use memory::{MemoryChannel, MemoryConnector};
pub use message::WireMessage;
pub use ws::{WsChannel, WsConnector, WsPeer, WsServer};
