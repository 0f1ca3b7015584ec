//! Streaming result viewer for the fire-detection backend.
//!
//! A [`VideoSession`] sends one job over a [`Channel`](ember_com::Channel),
//! uploads the payload (whole or in acknowledged chunks) and plays the
//! returned frames back at a fixed pace while keeping fire statistics, a
//! detection timeline and a one-shot alert. A [`CameraController`] does the
//! same for a live camera feed that is switched on and off explicitly.

pub mod alert;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod job;
pub mod pacer;
pub mod progress;
pub mod queue;
pub mod session;
pub mod sink;
pub mod state;
pub mod stats;
pub mod timeline;
pub mod upload;
#[cfg(feature = "window")]
pub mod window;

pub use alert::{AlertLatch, AlertSink, Alerts, CommandSpeaker, LogBanner, LogSpeaker, Speaker, Utterance};
pub use camera::CameraController;
pub use config::{Mode, ViewerConfig};
pub use error::ViewerError;
pub use frame::Frame;
pub use job::{ALLOWED_EXTENSIONS, JobSource, PreparedJob, ValidationLimits, extract_youtube_id, mime_for};
pub use pacer::Pacer;
pub use progress::Progress;
pub use queue::FrameQueue;
pub use session::{SessionHandle, VideoSession};
pub use sink::{DirectorySink, FrameSink, NullSink};
pub use state::{Outcome, Phase, ViewerSnapshot, ViewerState};
pub use stats::{FireStats, round2};
pub use timeline::{DetectionTime, DetectionTimeline};
pub use upload::{Ack, Uploader};
#[cfg(feature = "window")]
pub use window::WindowSink;
