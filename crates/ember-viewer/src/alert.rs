use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::Instant;

/// Spoken fire warning.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// BCP 47 language tag.
    pub lang: String,
    pub rate: f32,
}

impl Default for Utterance {
    fn default() -> Self {
        Self {
            text: "Cảnh báo phát hiện cháy, vui lòng kiểm tra ngay!".to_string(),
            lang: "vi-VN".to_string(),
            rate: 1.0,
        }
    }
}

/// One-shot fire alert.
///
/// `Armed` only when notifications are enabled. An armed latch fires once
/// and then stays `Fired`; `Idle` never fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLatch {
    Idle,
    Armed,
    Fired,
}

impl AlertLatch {
    pub fn new(notifications_enabled: bool) -> Self {
        if notifications_enabled {
            AlertLatch::Armed
        } else {
            AlertLatch::Idle
        }
    }

    /// Try to fire. Returns true exactly once for an armed latch.
    pub fn fire(&mut self) -> bool {
        if *self == AlertLatch::Armed {
            *self = AlertLatch::Fired;
            true
        } else {
            false
        }
    }

    pub fn has_fired(&self) -> bool {
        *self == AlertLatch::Fired
    }
}

/// Speech output for the fire warning.
pub trait Speaker {
    /// Speak `utterance`, cutting off anything still being spoken.
    fn speak(&mut self, utterance: &Utterance);
}

/// Banner surface for the fire warning.
pub trait AlertSink {
    fn show_banner(&mut self, text: &str);
    fn hide_banner(&mut self);
}

/// Logs the utterance instead of speaking it.
#[derive(Debug, Default)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&mut self, utterance: &Utterance) {
        log::warn!("[{}] {}", utterance.lang, utterance.text);
    }
}

/// Logs banner changes.
#[derive(Debug, Default)]
pub struct LogBanner;

impl AlertSink for LogBanner {
    fn show_banner(&mut self, text: &str) {
        log::warn!("ALERT: {}", text);
    }

    fn hide_banner(&mut self) {
        log::debug!("alert banner dismissed");
    }
}

/// Speaks through an external TTS program, e.g. `espeak-ng`.
///
/// The program is run as `program [args..] -v <lang> -s <words/min> <text>`.
/// A new utterance kills the previous process if it is still running.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandSpeaker {
    /// Base speaking rate in words per minute, scaled by `Utterance::rate`.
    const BASE_WPM: f32 = 175.0;

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            child: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn voice(lang: &str) -> &str {
        lang.split('-').next().unwrap_or(lang)
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, utterance: &Utterance) {
        if let Some(mut previous) = self.child.take() {
            let _ = previous.start_kill();
        }
        let wpm = (Self::BASE_WPM * utterance.rate).round().max(1.0) as u32;
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg("-v")
            .arg(Self::voice(&utterance.lang))
            .arg("-s")
            .arg(wpm.to_string())
            .arg(&utterance.text)
            .kill_on_drop(true)
            .spawn();
        match spawned {
            Ok(child) => self.child = Some(child),
            Err(e) => log::warn!("failed to run {}: {}", self.program, e),
        }
    }
}

/// The alert outputs a session drives, plus the banner dismissal deadline.
pub struct Alerts {
    speaker: Box<dyn Speaker + Send>,
    banner: Box<dyn AlertSink + Send>,
    dismiss_at: Option<Instant>,
}

impl Default for Alerts {
    fn default() -> Self {
        Self::new(Box::new(LogSpeaker), Box::new(LogBanner))
    }
}

impl Alerts {
    pub fn new(speaker: Box<dyn Speaker + Send>, banner: Box<dyn AlertSink + Send>) -> Self {
        Self {
            speaker,
            banner,
            dismiss_at: None,
        }
    }

    /// Show the banner, speak, and schedule the banner to go away.
    pub(crate) fn raise(&mut self, banner_text: &str, utterance: &Utterance, dismiss_after: Duration) {
        self.banner.show_banner(banner_text);
        self.speaker.speak(utterance);
        self.dismiss_at = Some(Instant::now() + dismiss_after);
    }

    /// When the banner is due to be hidden, if it is up.
    pub(crate) fn dismiss_deadline(&self) -> Option<Instant> {
        self.dismiss_at
    }

    pub(crate) fn dismiss(&mut self) {
        if self.dismiss_at.take().is_some() {
            self.banner.hide_banner();
        }
    }
}
