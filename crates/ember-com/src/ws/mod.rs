pub mod client;
pub mod server;
mod transport;

pub use client::{WsChannel, WsConnector};
pub use server::{WsPeer, WsServer};
