use crate::ViewerError;
use crate::frame::Frame;
use std::path::{Path, PathBuf};

/// Where displayed frames go.
pub trait FrameSink {
    /// Display `frame`, replacing whatever was shown before.
    fn show(&mut self, frame: &Frame) -> Result<(), ViewerError>;

    /// Blank the display.
    fn clear(&mut self) -> Result<(), ViewerError> {
        Ok(())
    }

    /// False once the display went away, e.g. the user closed the window.
    /// A session whose sink closes ends as if it were stopped.
    fn is_open(&self) -> bool {
        true
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn show(&mut self, frame: &Frame) -> Result<(), ViewerError> {
        (**self).show(frame)
    }

    fn clear(&mut self) -> Result<(), ViewerError> {
        (**self).clear()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Discards frames, counting them.
#[derive(Debug, Default)]
pub struct NullSink {
    shown: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl FrameSink for NullSink {
    fn show(&mut self, _frame: &Frame) -> Result<(), ViewerError> {
        self.shown += 1;
        Ok(())
    }
}

/// Writes every displayed frame to `dir/frame-NNNNNN.jpg`.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: u64,
}

impl DirectorySink {
    /// Create the sink, creating `dir` if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, ViewerError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path_for(&self, frame: &Frame) -> PathBuf {
        self.dir.join(format!("frame-{:06}.jpg", frame.seq()))
    }
}

impl FrameSink for DirectorySink {
    fn show(&mut self, frame: &Frame) -> Result<(), ViewerError> {
        std::fs::write(self.path_for(frame), frame.data())?;
        self.written += 1;
        Ok(())
    }
}
