/// One encoded image received from the backend.
///
/// Owned by the queue until displayed, then by the pacer until replaced.
/// Dropping a frame is what releases it.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    seq: u64,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(seq: u64, data: Vec<u8>) -> Self {
        Self { seq, data }
    }

    /// Arrival order within the session, starting at 0.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Encoded image bytes (JPEG from the backend).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
