use crate::config::ViewerConfig;
use crate::job::PreparedJob;
use ember_proto::{JobMetadata, StatusMessage};

/// How an upload payload goes over the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Uploader {
    /// Whole payload as one binary message right after the metadata.
    Single,
    /// Acknowledged chunks: `chunk_info`, wait `ready`, then per chunk
    /// `chunk_meta`, wait `chunk_ready`, send bytes.
    Chunked { chunk_size: usize },
}

/// Acknowledgment the chunked handshake waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ack {
    Ready,
    ChunkReady,
}

impl Ack {
    pub fn matches(&self, status: &StatusMessage) -> bool {
        matches!(
            (self, status),
            (Ack::Ready, StatusMessage::Ready { .. })
                | (Ack::ChunkReady, StatusMessage::ChunkReady { .. })
        )
    }
}

impl Uploader {
    pub fn from_config(config: &ViewerConfig) -> Self {
        if config.chunked() {
            Uploader::Chunked {
                chunk_size: config.chunk_size(),
            }
        } else {
            Uploader::Single
        }
    }

    /// Number of chunks `len` bytes split into. A single upload is one chunk.
    pub fn total_chunks(&self, len: usize) -> u32 {
        match self {
            Uploader::Single => 1,
            Uploader::Chunked { chunk_size } => len.div_ceil((*chunk_size).max(1)) as u32,
        }
    }

    /// Metadata sent right after authentication.
    pub fn opening_metadata(&self, job: &PreparedJob) -> JobMetadata {
        match (self, job) {
            (
                Uploader::Chunked { .. },
                PreparedJob::Upload {
                    file_name,
                    mime_type,
                    payload,
                },
            ) => JobMetadata::ChunkInfo {
                total_chunks: self.total_chunks(payload.len()),
                file_size: payload.len() as u64,
                file_name: file_name.clone(),
                mime_type: mime_type.clone(),
            },
            _ => job.metadata(),
        }
    }

    /// Split `payload` into `(index, bytes)` pieces in send order.
    pub fn chunks<'a>(&self, payload: &'a [u8]) -> Vec<(u32, &'a [u8])> {
        match self {
            Uploader::Single => vec![(0, payload)],
            Uploader::Chunked { chunk_size } => payload
                .chunks((*chunk_size).max(1))
                .enumerate()
                .map(|(index, chunk)| (index as u32, chunk))
                .collect(),
        }
    }

    /// Announcement for chunk `index` of a chunked upload.
    pub fn chunk_meta(&self, index: u32, total_chunks: u32, chunk: &[u8]) -> JobMetadata {
        JobMetadata::ChunkMeta {
            chunk_index: index,
            total_chunks,
            chunk_size: chunk.len() as u64,
        }
    }
}
