use std::fmt;
use std::time::Duration;

/// When a fire was detected.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectionTime {
    /// Position in the analyzed video.
    Offset(Duration),
    /// Wall-clock stamp reported by the camera endpoint, kept verbatim.
    Wall(String),
}

impl fmt::Display for DetectionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionTime::Offset(offset) => {
                let secs = offset.as_secs();
                write!(f, "{:02}:{:02}", secs / 60, secs % 60)
            }
            DetectionTime::Wall(stamp) => write!(f, "{stamp}"),
        }
    }
}

/// Append-only record of fire detections for one session.
#[derive(Clone, Debug, Default)]
pub struct DetectionTimeline {
    times: Vec<DetectionTime>,
}

impl DetectionTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a detection. Returns true if this was the first one.
    pub fn push(&mut self, time: DetectionTime) -> bool {
        self.times.push(time);
        self.times.len() == 1
    }

    pub fn last(&self) -> Option<&DetectionTime> {
        self.times.last()
    }

    /// Latest detection as shown to the user: `mm:ss` for offsets.
    pub fn last_formatted(&self) -> Option<String> {
        self.last().map(|t| t.to_string())
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectionTime> {
        self.times.iter()
    }
}
