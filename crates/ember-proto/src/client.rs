use crate::ProtoError;
use serde::{Deserialize, Serialize};

/// Text command that asks the camera endpoint to stop capturing.
pub const STOP_COMMAND: &str = "stop";

/// First message on the direct-process channel. `token: None` is the
/// anonymous marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthMessage {
    pub token: Option<String>,
}

impl AuthMessage {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Job description sent after [`AuthMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JobMetadata {
    /// Whole file follows as one binary message.
    #[serde(rename = "upload")]
    Upload {
        #[serde(rename = "fileName")]
        file_name: String,
    },

    /// Server fetches the video itself.
    #[serde(rename = "youtube")]
    YouTube { youtube_url: String },

    /// Announces a chunked transfer; the server answers `ready`.
    #[serde(rename = "chunk_info")]
    ChunkInfo {
        #[serde(rename = "totalChunks")]
        total_chunks: u32,
        #[serde(rename = "fileSize")]
        file_size: u64,
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },

    /// Announces one chunk; the server answers `chunk_ready`.
    #[serde(rename = "chunk_meta")]
    ChunkMeta {
        #[serde(rename = "chunkIndex")]
        chunk_index: u32,
        #[serde(rename = "totalChunks")]
        total_chunks: u32,
        #[serde(rename = "chunkSize")]
        chunk_size: u64,
    },
}

impl JobMetadata {
    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }
}
