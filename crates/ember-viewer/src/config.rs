use crate::alert::Utterance;
use std::time::Duration;

/// What the viewer is consuming.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Uploaded file or YouTube URL on the direct-process endpoint.
    Video,
    /// Live camera on the fire endpoint.
    Camera,
}

/// Configuration for a viewer session.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    mode: Mode,
    chunked: bool,
    notifications_enabled: bool,
    chunk_size: usize,
    pace_interval: Duration,
    queue_bound: usize,
    alert_dismiss: Duration,
    clock_interval: Duration,
    banner_text: String,
    utterance: Utterance,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Video,
            chunked: false,
            notifications_enabled: false,
            chunk_size: 5 * 1024 * 1024,
            pace_interval: Duration::from_millis(100),
            queue_bound: 10,
            alert_dismiss: Duration::from_secs(5),
            clock_interval: Duration::from_secs(1),
            banner_text: "Cảnh báo phát hiện cháy!".to_string(),
            utterance: Utterance::default(),
        }
    }
}

impl ViewerConfig {
    /// Set the mode (video or camera).
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Upload files in acknowledged chunks instead of one binary message.
    pub fn with_chunked(mut self, chunked: bool) -> Self {
        self.chunked = chunked;
        self
    }

    /// Arm the one-shot fire alert.
    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }

    /// Set the chunk size in bytes. Zero is treated as one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the playback tick.
    pub fn with_pace_interval(mut self, pace_interval: Duration) -> Self {
        self.pace_interval = pace_interval;
        self
    }

    /// Set how many undisplayed frames are kept. Zero is treated as one.
    pub fn with_queue_bound(mut self, queue_bound: usize) -> Self {
        self.queue_bound = queue_bound.max(1);
        self
    }

    /// Set how long the alert banner stays up.
    pub fn with_alert_dismiss(mut self, alert_dismiss: Duration) -> Self {
        self.alert_dismiss = alert_dismiss;
        self
    }

    /// Set the clock/frame-rate tick.
    pub fn with_clock_interval(mut self, clock_interval: Duration) -> Self {
        self.clock_interval = clock_interval;
        self
    }

    pub fn with_banner_text(mut self, banner_text: String) -> Self {
        self.banner_text = banner_text;
        self
    }

    /// Set the spoken alert.
    pub fn with_utterance(mut self, utterance: Utterance) -> Self {
        self.utterance = utterance;
        self
    }

    // Getters
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn chunked(&self) -> bool {
        self.chunked
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn pace_interval(&self) -> Duration {
        self.pace_interval
    }

    pub fn queue_bound(&self) -> usize {
        self.queue_bound
    }

    pub fn alert_dismiss(&self) -> Duration {
        self.alert_dismiss
    }

    pub fn clock_interval(&self) -> Duration {
        self.clock_interval
    }

    pub fn banner_text(&self) -> &str {
        &self.banner_text
    }

    pub fn utterance(&self) -> &Utterance {
        &self.utterance
    }
}
