use crate::frame::Frame;
use std::collections::VecDeque;

/// Bounded FIFO of frames waiting to be displayed.
///
/// `push` may overfill the queue; `trim` drops the oldest entries until it
/// holds at most `bound`. Every dropped frame is counted as released.
#[derive(Debug)]
pub struct FrameQueue {
    frames: VecDeque<Frame>,
    bound: usize,
    released: u64,
}

impl FrameQueue {
    pub fn new(bound: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(bound + 1),
            bound: bound.max(1),
            released: 0,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Drop the oldest frames beyond the bound. Returns how many were dropped.
    pub fn trim(&mut self) -> usize {
        let excess = self.frames.len().saturating_sub(self.bound);
        for _ in 0..excess {
            self.frames.pop_front();
        }
        self.released += excess as u64;
        excess
    }

    /// Release everything. Returns how many frames were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.frames.len();
        self.frames.clear();
        self.released += count as u64;
        count
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    /// Total frames dropped without being displayed.
    pub fn released(&self) -> u64 {
        self.released
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}
