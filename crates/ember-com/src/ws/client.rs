use super::transport::Transport;
use crate::{Channel, ChannelConfig, ComError, Connector, WireMessage};
use tokio::net::TcpStream;
use tokio_websockets::{ClientBuilder, MaybeTlsStream};

/// Client end of a WebSocket connection to a processing endpoint.
pub struct WsChannel {
    transport: Transport<MaybeTlsStream<TcpStream>>,
}

impl WsChannel {
    /// Connect to a `ws://` endpoint, e.g. `ws://localhost:8000/api/v1/ws/fire`.
    pub async fn connect(url: &str, config: &ChannelConfig) -> Result<Self, ComError> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e| ComError::InvalidUri(format!("{url}: {e}")))?;
        log::debug!("connecting to {}", uri);
        let (stream, _response) = ClientBuilder::from_uri(uri).connect().await?;

        Ok(Self {
            transport: Transport::new(stream, config.max_message_size()),
        })
    }
}

impl Channel for WsChannel {
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

/// Connects a fresh [`WsChannel`] to a fixed URL on every `connect`.
#[derive(Clone, Debug)]
pub struct WsConnector {
    url: String,
    config: ChannelConfig,
}

impl WsConnector {
    pub fn new(url: impl Into<String>, config: ChannelConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Connector for WsConnector {
    type Channel = WsChannel;

    async fn connect(&self) -> Result<WsChannel, ComError> {
        WsChannel::connect(&self.url, &self.config).await
    }
}
