use crate::ProtoError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Lifecycle envelope on the camera channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CameraStatus {
    Ready {
        #[serde(default)]
        message: String,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

/// One analyzed camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    #[serde(default)]
    pub frame_idx: u64,
    /// Wall-clock capture time as formatted by the backend.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub fire_detected: bool,
    #[serde(default)]
    pub total_area: f64,
    /// Base64-encoded JPEG.
    pub frame: String,
}

impl CameraFrame {
    pub fn new(frame_idx: u64, time: String, fire_detected: bool, total_area: f64, jpeg: &[u8]) -> Self {
        Self {
            frame_idx,
            time,
            fire_detected,
            total_area,
            frame: STANDARD.encode(jpeg),
        }
    }

    /// Decode the embedded JPEG bytes.
    pub fn image_bytes(&self) -> Result<Vec<u8>, ProtoError> {
        Ok(STANDARD.decode(self.frame.as_bytes())?)
    }
}

/// Anything the camera endpoint sends. Lifecycle envelopes carry a
/// `status` field; frames do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraMessage {
    Status(CameraStatus),
    Frame(CameraFrame),
}

impl CameraMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }
}
