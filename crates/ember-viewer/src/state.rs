use crate::alert::AlertLatch;
use crate::config::{Mode, ViewerConfig};
use crate::frame::Frame;
use crate::pacer::Pacer;
use crate::progress::Progress;
use crate::sink::FrameSink;
use crate::stats::FireStats;
use crate::timeline::{DetectionTime, DetectionTimeline};
use ember_proto::{CameraFrame, CameraMessage, CameraStatus, FrameInfo, StatusMessage};

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Transferring,
    Processing,
    Completed,
    Failed,
    Closed,
}

impl Phase {
    /// No further messages are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::Closed)
    }
}

/// Side effect the session driver has to carry out after an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    None,
    /// First detection with an armed latch: show the banner and speak.
    FireAlert,
    Completed,
    Failed(String),
}

/// Read-only view of the viewer published to observers.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerSnapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub status_line: String,
    pub progress: f64,
    pub fire: f64,
    pub background: f64,
    pub detections: usize,
    pub last_detection: Option<String>,
    pub alert_fired: bool,
    pub banner_visible: bool,
    pub processed_url: Option<String>,
    pub error: Option<String>,
    pub frames_received: u64,
    pub frames_processed: u64,
    pub frames_displayed: u64,
    pub frames_released: u64,
    pub queued: usize,
    pub current_frame: Option<u64>,
    pub fps: u32,
    pub current_time: Option<String>,
}

/// All mutable viewer state. Owned by exactly one task.
///
/// After `teardown` every mutator is a no-op.
#[derive(Debug)]
pub struct ViewerState {
    mode: Mode,
    phase: Phase,
    status_line: String,
    progress: Progress,
    stats: FireStats,
    timeline: DetectionTimeline,
    latch: AlertLatch,
    banner_visible: bool,
    processed_url: Option<String>,
    error: Option<String>,
    pacer: Pacer,
    next_seq: u64,
    frames_processed: u64,
    frames_this_second: u32,
    fps: u32,
    current_time: Option<String>,
    torn_down: bool,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            mode: config.mode(),
            phase: Phase::Connecting,
            status_line: "connecting".to_string(),
            progress: Progress::new(),
            stats: FireStats::default(),
            timeline: DetectionTimeline::new(),
            latch: AlertLatch::new(config.notifications_enabled()),
            banner_visible: false,
            processed_url: None,
            error: None,
            pacer: Pacer::new(config.queue_bound()),
            next_seq: 0,
            frames_processed: 0,
            frames_this_second: 0,
            fps: 0,
            current_time: None,
            torn_down: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> FireStats {
        self.stats
    }

    pub fn timeline(&self) -> &DetectionTimeline {
        &self.timeline
    }

    pub fn latch(&self) -> AlertLatch {
        self.latch
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn set_phase(&mut self, phase: Phase) {
        if !self.torn_down {
            self.phase = phase;
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        if !self.torn_down {
            self.status_line = status.into();
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        if !self.torn_down {
            self.pacer.set_playing(playing);
        }
    }

    /// Re-open a state that was torn down, keeping its timeline and latch.
    /// Used when a camera is switched back on.
    pub fn restart(&mut self) {
        self.torn_down = false;
        self.phase = Phase::Connecting;
        self.status_line = "connecting".to_string();
        self.error = None;
        self.frames_this_second = 0;
        self.fps = 0;
    }

    /// `sent` of `total` upload bytes are on the wire.
    pub fn upload_progress(&mut self, sent: u64, total: u64) {
        if !self.torn_down {
            self.progress.upload(sent, total);
        }
    }

    /// A binary frame arrived on the direct-process channel.
    pub fn push_frame(&mut self, data: Vec<u8>) {
        if self.torn_down {
            return;
        }
        let frame = Frame::new(self.next_seq, data);
        self.next_seq += 1;
        self.frames_this_second += 1;
        if matches!(self.phase, Phase::Connecting | Phase::Transferring) {
            self.phase = Phase::Processing;
        }
        self.pacer.enqueue(frame);
    }

    /// Pacing tick.
    pub fn tick<S: FrameSink>(&mut self, sink: &mut S) {
        if self.torn_down {
            return;
        }
        if let Err(e) = self.pacer.tick(sink) {
            log::warn!("failed to display frame: {}", e);
            self.status_line = format!("display error: {e}");
        }
    }

    /// Clock tick: refresh the displayed wall clock and frame rate.
    pub fn clock_tick(&mut self, now: String) {
        if self.torn_down {
            return;
        }
        self.fps = self.frames_this_second;
        self.frames_this_second = 0;
        self.current_time = Some(now);
    }

    /// Apply one status envelope from the direct-process channel.
    pub fn apply_status(&mut self, status: StatusMessage) -> Outcome {
        if self.torn_down {
            return Outcome::None;
        }
        match status {
            StatusMessage::Auth { message }
            | StatusMessage::Ready { message }
            | StatusMessage::Received { message }
            | StatusMessage::Info { message }
            | StatusMessage::Uploading { message } => {
                if !message.is_empty() {
                    self.status_line = message;
                }
                Outcome::None
            }
            StatusMessage::ChunkReady { .. } => Outcome::None,
            StatusMessage::Receiving {
                percent,
                current_chunk,
                total_chunks,
            } => {
                if let (Some(current), Some(total)) = (current_chunk, total_chunks) {
                    self.status_line = match percent {
                        Some(p) => format!("server received chunk {current}/{total} ({p:.0}%)"),
                        None => format!("server received chunk {current}/{total}"),
                    };
                }
                Outcome::None
            }
            StatusMessage::Processing { message } => {
                self.phase = Phase::Processing;
                self.status_line = if message.is_empty() {
                    "processing".to_string()
                } else {
                    message
                };
                Outcome::None
            }
            StatusMessage::Frame { frame_info } => {
                if matches!(self.phase, Phase::Connecting | Phase::Transferring) {
                    self.phase = Phase::Processing;
                }
                self.apply_frame_info(&frame_info)
            }
            StatusMessage::Progress {
                frames_processed,
                percent,
            } => {
                self.frames_processed = self.frames_processed.max(frames_processed);
                self.progress.processing(percent);
                Outcome::None
            }
            StatusMessage::Alert { message, .. } => {
                if !message.is_empty() {
                    self.status_line = message;
                }
                Outcome::None
            }
            StatusMessage::Completed { processed_url } => {
                if processed_url.is_some() {
                    self.processed_url = processed_url;
                }
                self.progress.complete();
                self.phase = Phase::Completed;
                self.status_line = "processing complete".to_string();
                Outcome::Completed
            }
            StatusMessage::Error { message } => {
                self.fail(message.clone());
                Outcome::Failed(message)
            }
            StatusMessage::Unknown => {
                log::debug!("ignoring unknown status");
                Outcome::None
            }
        }
    }

    fn apply_frame_info(&mut self, info: &FrameInfo) -> Outcome {
        self.stats = FireStats::from_area(info.total_area);
        if let Some(frame) = info.frame {
            self.frames_processed = self.frames_processed.max(frame);
        }
        if info.fire_detected {
            let offset = info
                .video_time
                .as_ref()
                .map(|t| t.offset())
                .unwrap_or_default();
            return self.record_detection(DetectionTime::Offset(offset));
        }
        Outcome::None
    }

    fn record_detection(&mut self, time: DetectionTime) -> Outcome {
        log::info!("fire detected at {}", time);
        if self.timeline.push(time) && self.latch.fire() {
            self.banner_visible = true;
            Outcome::FireAlert
        } else {
            Outcome::None
        }
    }

    /// Apply one message from the camera channel. Frames are shown at once.
    pub fn apply_camera<S: FrameSink>(&mut self, message: CameraMessage, sink: &mut S) -> Outcome {
        if self.torn_down {
            return Outcome::None;
        }
        match message {
            CameraMessage::Status(CameraStatus::Ready { message }) => {
                self.phase = Phase::Processing;
                self.status_line = if message.is_empty() {
                    "camera ready".to_string()
                } else {
                    message
                };
                Outcome::None
            }
            CameraMessage::Status(CameraStatus::Error { message }) => {
                self.fail(message.clone());
                Outcome::Failed(message)
            }
            CameraMessage::Frame(frame) => self.apply_camera_frame(frame, sink),
        }
    }

    fn apply_camera_frame<S: FrameSink>(&mut self, frame: CameraFrame, sink: &mut S) -> Outcome {
        if self.phase == Phase::Connecting {
            self.phase = Phase::Processing;
        }
        self.frames_this_second += 1;
        self.frames_processed = self.frames_processed.max(frame.frame_idx);
        match frame.image_bytes() {
            Ok(bytes) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                if let Err(e) = self.pacer.show_now(Frame::new(seq, bytes), sink) {
                    log::warn!("failed to display camera frame: {}", e);
                    self.status_line = format!("display error: {e}");
                }
            }
            Err(e) => log::warn!("camera frame {} has a bad image: {}", frame.frame_idx, e),
        }
        self.stats = FireStats::from_area(frame.total_area);
        if frame.fire_detected {
            return self.record_detection(DetectionTime::Wall(frame.time));
        }
        Outcome::None
    }

    pub fn hide_banner(&mut self) {
        if !self.torn_down {
            self.banner_visible = false;
        }
    }

    /// Record a failure reported by the backend or the transport.
    pub fn fail(&mut self, message: String) {
        if self.torn_down {
            return;
        }
        log::error!("{}", message);
        self.status_line = format!("error: {message}");
        self.error = Some(message);
        self.phase = Phase::Failed;
    }

    /// The channel went away. Completed and failed sessions keep their phase.
    pub fn channel_closed(&mut self) {
        if self.torn_down {
            return;
        }
        if !matches!(self.phase, Phase::Completed | Phase::Failed) {
            self.phase = Phase::Closed;
            self.status_line = "connection closed".to_string();
        }
    }

    /// Blank the display and release the current frame.
    pub fn clear_display<S: FrameSink>(&mut self, sink: &mut S) {
        if let Err(e) = self.pacer.clear_display(sink) {
            log::warn!("failed to clear display: {}", e);
        }
    }

    /// Release every frame and freeze the state.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.pacer.teardown();
        self.banner_visible = false;
        if !self.phase.is_terminal() {
            self.phase = Phase::Closed;
        }
        self.torn_down = true;
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            mode: self.mode,
            phase: self.phase,
            status_line: self.status_line.clone(),
            progress: self.progress.value(),
            fire: self.stats.fire(),
            background: self.stats.background(),
            detections: self.timeline.len(),
            last_detection: self.timeline.last_formatted(),
            alert_fired: self.latch.has_fired(),
            banner_visible: self.banner_visible,
            processed_url: self.processed_url.clone(),
            error: self.error.clone(),
            frames_received: self.next_seq,
            frames_processed: self.frames_processed,
            frames_displayed: self.pacer.displayed(),
            frames_released: self.pacer.released(),
            queued: self.pacer.queued(),
            current_frame: self.pacer.current().map(|f| f.seq()),
            fps: self.fps,
            current_time: self.current_time.clone(),
        }
    }
}
