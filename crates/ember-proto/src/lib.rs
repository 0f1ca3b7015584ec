//! Wire envelopes spoken on the fire-detection streaming endpoints.
//!
//! The direct-process endpoint receives [`AuthMessage`] then [`JobMetadata`]
//! (and binary payloads), and answers with binary JPEG frames interleaved
//! with [`StatusMessage`] envelopes. The camera endpoint answers with
//! [`CameraMessage`] values and accepts the text command [`STOP_COMMAND`].

pub mod camera;
pub mod client;
pub mod error;
pub mod status;

pub use camera::{CameraFrame, CameraMessage, CameraStatus};
pub use client::{AuthMessage, JobMetadata, STOP_COMMAND};
pub use error::ProtoError;
pub use status::{FrameInfo, StatusMessage, VideoTime};
