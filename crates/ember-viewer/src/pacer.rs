use crate::ViewerError;
use crate::frame::Frame;
use crate::queue::FrameQueue;
use crate::sink::FrameSink;

/// Plays queued frames back at a fixed rate.
///
/// Each `tick` pops at most one frame, hands it to the sink and releases the
/// frame that was on screen before. The queue is trimmed after every
/// enqueue and every tick, paused or not.
#[derive(Debug)]
pub struct Pacer {
    queue: FrameQueue,
    current: Option<Frame>,
    playing: bool,
    displayed: u64,
    released: u64,
}

impl Pacer {
    pub fn new(queue_bound: usize) -> Self {
        Self {
            queue: FrameQueue::new(queue_bound),
            current: None,
            playing: true,
            displayed: 0,
            released: 0,
        }
    }

    pub fn enqueue(&mut self, frame: Frame) {
        self.queue.push(frame);
        let dropped = self.queue.trim();
        if dropped > 0 {
            log::trace!("queue full, dropped {} frame(s)", dropped);
        }
    }

    /// Advance playback by one frame. Returns the sequence number shown, if any.
    pub fn tick<S: FrameSink>(&mut self, sink: &mut S) -> Result<Option<u64>, ViewerError> {
        let shown = if self.playing {
            match self.queue.pop() {
                Some(frame) => Some(self.display(frame, sink)?),
                None => None,
            }
        } else {
            None
        };
        self.queue.trim();
        Ok(shown)
    }

    /// Display `frame` right away, bypassing the queue.
    pub fn show_now<S: FrameSink>(&mut self, frame: Frame, sink: &mut S) -> Result<u64, ViewerError> {
        self.display(frame, sink)
    }

    fn display<S: FrameSink>(&mut self, frame: Frame, sink: &mut S) -> Result<u64, ViewerError> {
        let seq = frame.seq();
        // The new frame becomes current even if the sink fails; the old one
        // is released either way.
        let result = sink.show(&frame);
        if self.current.replace(frame).is_some() {
            self.released += 1;
        }
        self.displayed += 1;
        result.map(|()| seq)
    }

    /// Release the displayed frame and blank the sink.
    pub fn clear_display<S: FrameSink>(&mut self, sink: &mut S) -> Result<(), ViewerError> {
        if self.current.take().is_some() {
            self.released += 1;
        }
        sink.clear()
    }

    /// Release everything, queued and displayed.
    pub fn teardown(&mut self) {
        self.queue.clear();
        if self.current.take().is_some() {
            self.released += 1;
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn queue_bound(&self) -> usize {
        self.queue.bound()
    }

    /// Frames handed to the sink so far.
    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    /// Frames released so far, displayed or not.
    pub fn released(&self) -> u64 {
        self.released + self.queue.released()
    }
}
