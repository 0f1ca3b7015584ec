use super::transport::Transport;
use crate::{Channel, ChannelConfig, ComError, WireMessage};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_websockets::ServerBuilder;

/// Server end of one accepted WebSocket connection.
pub struct WsPeer {
    path: String,
    addr: SocketAddr,
    transport: Transport<TcpStream>,
}

impl WsPeer {
    /// Request path the client connected to, e.g. `/api/v1/ws/fire`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Channel for WsPeer {
    async fn send(&mut self, message: WireMessage) -> Result<(), ComError> {
        self.transport.send(message).await
    }

    async fn recv(&mut self) -> Result<WireMessage, ComError> {
        self.transport.recv().await
    }

    async fn close(&mut self) -> Result<(), ComError> {
        self.transport.close().await
    }
}

/// Accepts WebSocket connections and hands each one out as a [`WsPeer`].
///
/// Used by the local mock backend and by tests that script a backend.
pub struct WsServer {
    rx: mpsc::Receiver<WsPeer>,
    accept_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl WsServer {
    /// Bind a TCP listener and start accepting WebSocket connections.
    ///
    /// The handshake runs in a background task per connection so that a slow
    /// client cannot hold up the accept loop.
    pub async fn bind(addr: impl ToSocketAddrs, config: ChannelConfig) -> Result<Self, ComError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let (tx, rx) = mpsc::channel(16);

        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((tcp_stream, addr)) => {
                        let tx = tx.clone();
                        let max_message_size = config.max_message_size();
                        tokio::spawn(async move {
                            let (request, ws_stream) =
                                match ServerBuilder::new().accept(tcp_stream).await {
                                    Ok(accepted) => accepted,
                                    Err(e) => {
                                        log::warn!("WebSocket handshake failed for {}: {}", addr, e);
                                        return;
                                    }
                                };
                            let peer = WsPeer {
                                path: request.uri().path().to_string(),
                                addr,
                                transport: Transport::new(ws_stream, max_message_size),
                            };
                            log::debug!("accepted {} on {}", addr, peer.path);
                            if tx.send(peer).await.is_err() {
                                log::debug!("server dropped before {} was handed out", addr);
                            }
                        });
                    }
                    Err(e) => {
                        log::warn!("Accept error: {}", e);
                        // Backoff to prevent CPU spin on persistent errors
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                }
            }
        });

        Ok(Self {
            rx,
            accept_task,
            local_addr,
        })
    }

    /// Wait for the next connection that completed its handshake.
    pub async fn accept(&mut self) -> Result<WsPeer, ComError> {
        self.rx.recv().await.ok_or(ComError::ConnectionClosed)
    }

    /// Return the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `ws://` URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("ws://{}{}", self.local_addr, path)
    }
}

impl Drop for WsServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
