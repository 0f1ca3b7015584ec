/// Overall job progress in percent.
///
/// The upload covers `0..=50`, processing covers `50..100` and only
/// `complete` reaches 100. The value never decreases.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Progress {
    value: f64,
    completed: bool,
}

impl Progress {
    /// Upload share of the indicator.
    pub const UPLOAD_SPAN: f64 = 50.0;
    /// Advance per `progress` message that carries no percentage.
    pub const PROCESSING_STEP: f64 = 1.0;
    /// Ceiling before `completed` arrives.
    pub const PROCESSING_CAP: f64 = 99.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// `sent` of `total` payload bytes are on the wire.
    pub fn upload(&mut self, sent: u64, total: u64) {
        let fraction = if total == 0 {
            1.0
        } else {
            (sent.min(total) as f64) / (total as f64)
        };
        self.raise(Self::UPLOAD_SPAN * fraction);
    }

    /// Backend reported processing progress.
    pub fn processing(&mut self, percent: Option<f64>) {
        let target = match percent {
            Some(p) if p.is_finite() => Self::UPLOAD_SPAN + p.clamp(0.0, 100.0) / 2.0,
            _ => self.value.max(Self::UPLOAD_SPAN) + Self::PROCESSING_STEP,
        };
        self.raise(target.min(Self::PROCESSING_CAP));
    }

    pub fn complete(&mut self) {
        self.completed = true;
        self.value = 100.0;
    }

    fn raise(&mut self, target: f64) {
        if !self.completed && target > self.value {
            self.value = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_maps_to_first_half() {
        let mut progress = Progress::new();
        progress.upload(1, 4);
        assert_eq!(progress.value(), 12.5);
        progress.upload(4, 4);
        assert_eq!(progress.value(), 50.0);
    }

    #[test]
    fn test_processing_capped_before_completion() {
        let mut progress = Progress::new();
        progress.processing(Some(100.0));
        assert_eq!(progress.value(), 99.0);
        progress.complete();
        assert_eq!(progress.value(), 100.0);
    }

    #[test]
    fn test_never_decreases() {
        let mut progress = Progress::new();
        progress.processing(Some(60.0));
        progress.upload(0, 10);
        progress.processing(Some(10.0));
        assert_eq!(progress.value(), 80.0);
    }

    #[test]
    fn test_step_without_percent() {
        let mut progress = Progress::new();
        progress.processing(None);
        assert_eq!(progress.value(), 51.0);
        progress.processing(None);
        assert_eq!(progress.value(), 52.0);
    }
}
