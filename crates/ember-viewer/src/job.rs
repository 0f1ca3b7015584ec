use crate::ViewerError;
use ember_proto::JobMetadata;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Video container extensions the backend accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

fn youtube_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?:\?v=|/embed/|\.be/|/shorts/)([A-Za-z0-9_-]{11})").ok())
        .as_ref()
}

/// Extract the 11-character video id from a YouTube URL.
pub fn extract_youtube_id(url: &str) -> Option<&str> {
    youtube_id_pattern()?
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// MIME type announced for a chunked upload, by extension.
pub fn mime_for(path: &Path) -> &'static str {
    match extension_of(path).as_deref() {
        Some("mp4") => "video/mp4",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Limits applied before a job is sent.
#[derive(Clone, Debug)]
pub struct ValidationLimits {
    max_upload_bytes: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ValidationLimits {
    /// Set the largest accepted upload in bytes.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}

/// What the user asked to analyze.
#[derive(Clone, Debug, PartialEq)]
pub enum JobSource {
    Upload(PathBuf),
    YouTube(String),
}

impl JobSource {
    /// Check the source and load the upload payload.
    pub async fn prepare(&self, limits: &ValidationLimits) -> Result<PreparedJob, ViewerError> {
        match self {
            JobSource::YouTube(url) => {
                let url = url.trim();
                if extract_youtube_id(url).is_none() {
                    return Err(ViewerError::InvalidJob(format!("not a YouTube video URL: {url}")));
                }
                Ok(PreparedJob::YouTube {
                    url: url.to_string(),
                })
            }
            JobSource::Upload(path) => {
                let metadata = tokio::fs::metadata(path).await.map_err(|e| {
                    ViewerError::InvalidJob(format!("{}: {}", path.display(), e))
                })?;
                if !metadata.is_file() {
                    return Err(ViewerError::InvalidJob(format!(
                        "{} is not a file",
                        path.display()
                    )));
                }
                match extension_of(path) {
                    Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
                    _ => {
                        return Err(ViewerError::InvalidJob(format!(
                            "unsupported video format: {} (expected one of {})",
                            path.display(),
                            ALLOWED_EXTENSIONS.join(", ")
                        )));
                    }
                }
                if metadata.len() == 0 {
                    return Err(ViewerError::InvalidJob(format!("{} is empty", path.display())));
                }
                if metadata.len() > limits.max_upload_bytes() {
                    return Err(ViewerError::InvalidJob(format!(
                        "{} is {} bytes, limit is {}",
                        path.display(),
                        metadata.len(),
                        limits.max_upload_bytes()
                    )));
                }
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.mp4".to_string());
                let payload = tokio::fs::read(path).await?;
                Ok(PreparedJob::Upload {
                    file_name,
                    mime_type: mime_for(path).to_string(),
                    payload,
                })
            }
        }
    }
}

/// A validated job, ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub enum PreparedJob {
    Upload {
        file_name: String,
        mime_type: String,
        payload: Vec<u8>,
    },
    YouTube {
        url: String,
    },
}

impl PreparedJob {
    /// In-memory upload, for callers that already hold the bytes.
    pub fn upload(file_name: impl Into<String>, payload: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(Path::new(&file_name)).to_string();
        PreparedJob::Upload {
            file_name,
            mime_type,
            payload,
        }
    }

    pub fn youtube(url: impl Into<String>) -> Self {
        PreparedJob::YouTube { url: url.into() }
    }

    /// Metadata for a single-message transfer.
    pub fn metadata(&self) -> JobMetadata {
        match self {
            PreparedJob::Upload { file_name, .. } => JobMetadata::Upload {
                file_name: file_name.clone(),
            },
            PreparedJob::YouTube { url } => JobMetadata::YouTube {
                youtube_url: url.clone(),
            },
        }
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            PreparedJob::Upload { payload, .. } => Some(payload),
            PreparedJob::YouTube { .. } => None,
        }
    }
}
