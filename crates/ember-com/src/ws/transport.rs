use crate::{ComError, WireMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_websockets::{Message, WebSocketStream};

/// Shared send/recv logic for both ends of a WebSocket connection.
pub(crate) struct Transport<S> {
    stream: WebSocketStream<S>,
    max_message_size: usize,
    closed: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Transport<S> {
    pub(crate) fn new(stream: WebSocketStream<S>, max_message_size: usize) -> Self {
        Self {
            stream,
            max_message_size,
            closed: false,
        }
    }

    pub(crate) async fn send(&mut self, message: WireMessage) -> Result<(), ComError> {
        if self.closed {
            return Err(ComError::ConnectionClosed);
        }
        let msg = match message {
            WireMessage::Text(text) => Message::text(text),
            WireMessage::Binary(data) => Message::binary(data),
        };
        self.stream.send(msg).await?;
        Ok(())
    }

    /// Ping/pong frames are answered by the stream itself and skipped here.
    pub(crate) async fn recv(&mut self) -> Result<WireMessage, ComError> {
        loop {
            match self.stream.next().await {
                Some(Ok(msg)) => {
                    if msg.is_close() {
                        self.closed = true;
                        return Err(ComError::ConnectionClosed);
                    }
                    if let Some(text) = msg.as_text() {
                        if text.len() > self.max_message_size {
                            return Err(ComError::MessageTooLarge(text.len()));
                        }
                        return Ok(WireMessage::Text(text.to_string()));
                    }
                    if msg.is_binary() {
                        let payload = msg.into_payload();
                        if payload.len() > self.max_message_size {
                            return Err(ComError::MessageTooLarge(payload.len()));
                        }
                        return Ok(WireMessage::Binary(payload.to_vec()));
                    }
                }
                Some(Err(e)) => return Err(ComError::from(e)),
                None => {
                    self.closed = true;
                    return Err(ComError::ConnectionClosed);
                }
            }
        }
    }

    pub(crate) async fn close(&mut self) -> Result<(), ComError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.close().await {
            Ok(()) => Ok(()),
            Err(e) => {
                log::debug!("close handshake failed: {}", e);
                Ok(())
            }
        }
    }
}
