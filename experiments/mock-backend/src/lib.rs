//! Scripted stand-in for the fire-detection backend.
//!
//! Speaks both streaming protocols: the direct-process endpoint (auth, job
//! metadata, single or chunked upload, then frames with `frame`/`progress`
//! statuses and a final `completed`) and the live camera endpoint.

use ember_base::log;
use ember_com::{Channel, ComError, WireMessage};
use ember_proto::{CameraFrame, CameraMessage, CameraStatus, FrameInfo, JobMetadata, STOP_COMMAND, StatusMessage, VideoTime};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

pub const DIRECT_PROCESS_PATH: &str = "/api/v1/ws/direct-process";
pub const CAMERA_PATH: &str = "/api/v1/ws/fire";

/// Fire area reported for frames flagged as fire.
const FIRE_AREA: f64 = 12.5;

/// What the mock sends back for every job.
#[derive(Clone, Debug)]
pub struct Script {
    frames: Vec<Vec<u8>>,
    frame_count: u64,
    fire_every: u64,
    interval: Duration,
    fps: f64,
    processed_url: String,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            frame_count: 60,
            fire_every: 20,
            interval: Duration::from_millis(100),
            fps: 10.0,
            processed_url: "https://res.cloudinary.com/demo/video/upload/v1/processed.mp4".to_string(),
        }
    }
}

impl Script {
    /// Replay these JPEG images, cycling through them.
    pub fn with_frames(mut self, frames: Vec<Vec<u8>>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_frame_count(mut self, frame_count: u64) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Flag every n-th frame as fire. 0 never flags.
    pub fn with_fire_every(mut self, fire_every: u64) -> Self {
        self.fire_every = fire_every;
        self
    }

    /// Delay between frames.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn processed_url(&self) -> &str {
        &self.processed_url
    }

    pub fn is_fire(&self, index: u64) -> bool {
        self.fire_every > 0 && (index + 1) % self.fire_every == 0
    }

    fn jpeg(&self, index: u64) -> Vec<u8> {
        if self.frames.is_empty() {
            synthetic_jpeg(index, self.is_fire(index))
        } else {
            self.frames[(index as usize) % self.frames.len()].clone()
        }
    }

    fn area(&self, index: u64) -> f64 {
        if self.is_fire(index) { FIRE_AREA } else { 0.0 }
    }
}

/// Small gradient test image; fire frames are tinted red.
pub fn synthetic_jpeg(index: u64, fire: bool) -> Vec<u8> {
    let shift = (index * 4 % 256) as u8;
    let image = RgbImage::from_fn(160, 120, |x, y| {
        let base = (x as u8).wrapping_add(shift);
        if fire {
            Rgb([255, base / 2, (y as u8) / 4])
        } else {
            Rgb([base / 3, (y as u8).wrapping_add(shift), 128])
        }
    });
    let mut buf = Cursor::new(Vec::new());
    if let Err(e) = image.write_to(&mut buf, ImageFormat::Jpeg) {
        log::warn!("failed to encode test frame: {}", e);
    }
    buf.into_inner()
}

/// Load every `.jpg`/`.jpeg` in `dir`, sorted by name.
pub async fn load_frames(dir: &Path) -> std::io::Result<Vec<Vec<u8>>> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_jpeg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
        if is_jpeg {
            paths.push(path);
        }
    }
    paths.sort();
    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        frames.push(tokio::fs::read(path).await?);
    }
    Ok(frames)
}

async fn send_status<C: Channel>(channel: &mut C, status: StatusMessage) -> Result<(), ComError> {
    let text = status
        .to_json()
        .map_err(|e| ComError::Protocol(e.to_string()))?;
    channel.send(WireMessage::Text(text)).await
}

async fn recv_text<C: Channel>(channel: &mut C) -> Result<String, ComError> {
    match channel.recv().await? {
        WireMessage::Text(text) => Ok(text),
        WireMessage::Binary(data) => Err(ComError::Protocol(format!(
            "expected text, got {} binary bytes",
            data.len()
        ))),
    }
}

async fn recv_binary<C: Channel>(channel: &mut C) -> Result<Vec<u8>, ComError> {
    match channel.recv().await? {
        WireMessage::Binary(data) => Ok(data),
        WireMessage::Text(text) => Err(ComError::Protocol(format!("expected binary, got {text}"))),
    }
}

async fn recv_metadata<C: Channel>(channel: &mut C) -> Result<JobMetadata, ComError> {
    let text = recv_text(channel).await?;
    JobMetadata::from_json(&text).map_err(|e| ComError::Protocol(e.to_string()))
}

fn info(message: impl Into<String>) -> StatusMessage {
    StatusMessage::Info {
        message: message.into(),
    }
}

/// Receive a chunked upload announced by `total_chunks`. Returns the bytes
/// received.
async fn receive_chunks<C: Channel>(channel: &mut C, total_chunks: u32) -> Result<u64, ComError> {
    send_status(channel, StatusMessage::Ready { message: "ready for chunks".to_string() }).await?;
    let mut received = 0u64;
    for expected in 0..total_chunks {
        match recv_metadata(channel).await? {
            JobMetadata::ChunkMeta { chunk_index, .. } if chunk_index == expected => {}
            other => {
                return Err(ComError::Protocol(format!(
                    "expected chunk_meta {expected}, got {other:?}"
                )));
            }
        }
        send_status(channel, StatusMessage::ChunkReady { message: String::new() }).await?;
        received += recv_binary(channel).await?.len() as u64;
        let current = expected + 1;
        send_status(
            channel,
            StatusMessage::Receiving {
                percent: Some(f64::from(current) * 100.0 / f64::from(total_chunks)),
                current_chunk: Some(current),
                total_chunks: Some(total_chunks),
            },
        )
        .await?;
    }
    Ok(received)
}

/// Serve one job on the direct-process protocol.
///
/// Protocol violations are reported to the client as an `error` status.
pub async fn serve_direct<C: Channel>(channel: &mut C, script: &Script) -> Result<(), ComError> {
    match run_job(channel, script).await {
        Err(ComError::Protocol(message)) => {
            log::warn!("client broke protocol: {}", message);
            send_status(channel, StatusMessage::Error { message }).await?;
            channel.close().await
        }
        other => other,
    }
}

async fn run_job<C: Channel>(channel: &mut C, script: &Script) -> Result<(), ComError> {
    let auth = recv_text(channel).await?;
    log::debug!("auth: {}", auth);
    send_status(channel, StatusMessage::Auth { message: "authenticated".to_string() }).await?;

    match recv_metadata(channel).await? {
        JobMetadata::YouTube { youtube_url } => {
            log::info!("youtube job {}", youtube_url);
            send_status(channel, info("downloading video")).await?;
        }
        JobMetadata::Upload { file_name } => {
            let size = recv_binary(channel).await?.len();
            log::info!("upload {} ({} bytes)", file_name, size);
            send_status(channel, StatusMessage::Received { message: format!("received {size} bytes") }).await?;
        }
        JobMetadata::ChunkInfo {
            total_chunks,
            file_size,
            file_name,
            ..
        } => {
            let received = receive_chunks(channel, total_chunks).await?;
            if received != file_size {
                return Err(ComError::Protocol(format!(
                    "{file_name}: expected {file_size} bytes, got {received}"
                )));
            }
            log::info!("chunked upload {} ({} bytes in {} chunks)", file_name, received, total_chunks);
            send_status(channel, StatusMessage::Received { message: "file received".to_string() }).await?;
        }
        other => return Err(ComError::Protocol(format!("unexpected job message {other:?}"))),
    }

    send_status(channel, StatusMessage::Processing { message: "analyzing video".to_string() }).await?;
    replay(channel, script).await?;
    send_status(
        channel,
        StatusMessage::Completed {
            processed_url: Some(script.processed_url.clone()),
        },
    )
    .await?;
    channel.close().await
}

async fn replay<C: Channel>(channel: &mut C, script: &Script) -> Result<(), ComError> {
    let mut ticker = interval(script.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    for index in 0..script.frame_count {
        ticker.tick().await;
        channel.send(WireMessage::Binary(script.jpeg(index))).await?;
        let frame_info = FrameInfo {
            frame: Some(index + 1),
            video_time: Some(VideoTime::Seconds(index as f64 / script.fps)),
            fire_detected: script.is_fire(index),
            total_area: script.area(index),
            confidence: script.is_fire(index).then_some(0.87),
        };
        send_status(channel, StatusMessage::Frame { frame_info }).await?;
        if (index + 1) % 10 == 0 {
            send_status(
                channel,
                StatusMessage::Progress {
                    frames_processed: index + 1,
                    percent: Some((index + 1) as f64 * 100.0 / script.frame_count as f64),
                },
            )
            .await?;
        }
    }
    Ok(())
}

/// Serve the camera protocol until the client sends `stop` or goes away.
pub async fn serve_camera<C: Channel>(channel: &mut C, script: &Script) -> Result<(), ComError> {
    let ready = CameraMessage::Status(CameraStatus::Ready {
        message: "camera ready".to_string(),
    });
    send_camera(channel, &ready).await?;

    let mut ticker = interval(script.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut index = 0u64;
    loop {
        tokio::select! {
            received = channel.recv() => match received {
                Ok(WireMessage::Text(text)) if text == STOP_COMMAND => {
                    log::info!("camera stopped by client after {} frames", index);
                    return channel.close().await;
                }
                Ok(_) => log::debug!("ignoring client message on camera channel"),
                Err(ComError::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(e),
            },
            _ = ticker.tick() => {
                let time = chrono::Local::now().format("%H:%M:%S").to_string();
                let frame = CameraFrame::new(
                    index,
                    time,
                    script.is_fire(index),
                    script.area(index),
                    &script.jpeg(index),
                );
                send_camera(channel, &CameraMessage::Frame(frame)).await?;
                index += 1;
            }
        }
    }
}

async fn send_camera<C: Channel>(channel: &mut C, message: &CameraMessage) -> Result<(), ComError> {
    let text = message
        .to_json()
        .map_err(|e| ComError::Protocol(e.to_string()))?;
    channel.send(WireMessage::Text(text)).await
}
