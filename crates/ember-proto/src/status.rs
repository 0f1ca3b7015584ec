use crate::ProtoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Video-relative timestamp of an analyzed frame.
///
/// The backend reports either `"HH:MM:SS"` / `"MM:SS"` text or plain seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoTime {
    Seconds(f64),
    Text(String),
}

impl VideoTime {
    /// Offset from the start of the video. Unparseable text counts as zero.
    pub fn offset(&self) -> Duration {
        match self {
            VideoTime::Seconds(secs) => seconds_to_duration(*secs),
            VideoTime::Text(text) => {
                let parts: Option<Vec<f64>> = text
                    .trim()
                    .split(':')
                    .map(|part| part.trim().parse::<f64>().ok())
                    .collect();
                let secs = match parts.as_deref() {
                    Some([h, m, s]) => h * 3600.0 + m * 60.0 + s,
                    Some([m, s]) => m * 60.0 + s,
                    Some([s]) => *s,
                    _ => 0.0,
                };
                seconds_to_duration(secs)
            }
        }
    }
}

/// Negative, non-finite and out-of-range values count as zero.
fn seconds_to_duration(secs: f64) -> Duration {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    }
}

impl fmt::Display for VideoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoTime::Seconds(secs) => write!(f, "{secs}s"),
            VideoTime::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Per-frame analysis result attached to a `frame` status.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameInfo {
    #[serde(default)]
    pub frame: Option<u64>,
    #[serde(default)]
    pub video_time: Option<VideoTime>,
    #[serde(default)]
    pub fire_detected: bool,
    /// Fire area as a percentage of the frame.
    #[serde(default)]
    pub total_area: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// JSON envelope on the direct-process channel, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusMessage {
    Auth {
        #[serde(default)]
        message: String,
    },
    Ready {
        #[serde(default)]
        message: String,
    },
    ChunkReady {
        #[serde(default)]
        message: String,
    },
    Receiving {
        #[serde(default)]
        percent: Option<f64>,
        #[serde(default, rename = "currentChunk")]
        current_chunk: Option<u32>,
        #[serde(default, rename = "totalChunks")]
        total_chunks: Option<u32>,
    },
    Received {
        #[serde(default)]
        message: String,
    },
    Info {
        #[serde(default)]
        message: String,
    },
    Uploading {
        #[serde(default)]
        message: String,
    },
    Processing {
        #[serde(default)]
        message: String,
    },
    Frame {
        frame_info: FrameInfo,
    },
    Progress {
        #[serde(default)]
        frames_processed: u64,
        #[serde(default)]
        percent: Option<f64>,
    },
    Alert {
        #[serde(default)]
        message: String,
        #[serde(default)]
        frame_info: Option<FrameInfo>,
    },
    Completed {
        #[serde(default)]
        processed_url: Option<String>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl StatusMessage {
    pub fn from_json(text: &str) -> Result<Self, ProtoError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short tag used in logs.
    pub fn tag(&self) -> &'static str {
        match self {
            StatusMessage::Auth { .. } => "auth",
            StatusMessage::Ready { .. } => "ready",
            StatusMessage::ChunkReady { .. } => "chunk_ready",
            StatusMessage::Receiving { .. } => "receiving",
            StatusMessage::Received { .. } => "received",
            StatusMessage::Info { .. } => "info",
            StatusMessage::Uploading { .. } => "uploading",
            StatusMessage::Processing { .. } => "processing",
            StatusMessage::Frame { .. } => "frame",
            StatusMessage::Progress { .. } => "progress",
            StatusMessage::Alert { .. } => "alert",
            StatusMessage::Completed { .. } => "completed",
            StatusMessage::Error { .. } => "error",
            StatusMessage::Unknown => "unknown",
        }
    }
}
