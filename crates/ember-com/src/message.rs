use crate::ComError;
use serde::Serialize;

/// One application-level message on a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WireMessage {
    /// Serialize `value` as a JSON text message.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ComError> {
        Ok(WireMessage::Text(serde_json::to_string(value)?))
    }

    pub fn len(&self) -> usize {
        match self {
            WireMessage::Text(text) => text.len(),
            WireMessage::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireMessage::Text(text) => Some(text),
            WireMessage::Binary(_) => None,
        }
    }
}
