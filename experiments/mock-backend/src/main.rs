use clap::Parser;
use ember_base::log;
use ember_com::{ChannelConfig, WsServer};
use mock_backend::{CAMERA_PATH, DIRECT_PROCESS_PATH, Script, load_frames, serve_camera, serve_direct};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "mock-backend", about = "Scripted fire-detection backend for local testing")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: String,

    /// Directory of JPEG frames to replay (default: generated frames)
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Frames per job
    #[arg(long, default_value_t = 60)]
    count: u64,

    /// Flag every n-th frame as fire (0 = never)
    #[arg(long, default_value_t = 20)]
    fire_every: u64,

    /// Milliseconds between frames
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ember_base::init_stdout_logger();
    let cli = Cli::parse();

    let mut script = Script::default()
        .with_frame_count(cli.count)
        .with_fire_every(cli.fire_every)
        .with_interval(Duration::from_millis(cli.interval_ms));
    if let Some(dir) = &cli.frames {
        let frames = load_frames(dir).await?;
        log::info!("replaying {} frames from {}", frames.len(), dir.display());
        script = script.with_frames(frames);
    }
    let script = Arc::new(script);

    let mut server = WsServer::bind(&cli.addr, ChannelConfig::default()).await?;
    log::info!("Mock backend");
    log::info!("  jobs:   {}", server.url(DIRECT_PROCESS_PATH));
    log::info!("  camera: {}", server.url(CAMERA_PATH));

    loop {
        let mut peer = server.accept().await?;
        let script = Arc::clone(&script);
        tokio::spawn(async move {
            let addr = peer.addr();
            let path = peer.path().to_string();
            let result = match path.as_str() {
                DIRECT_PROCESS_PATH => serve_direct(&mut peer, &script).await,
                CAMERA_PATH => serve_camera(&mut peer, &script).await,
                other => {
                    log::warn!("{} asked for unknown path {}", addr, other);
                    return;
                }
            };
            match result {
                Ok(()) => log::info!("{} done", addr),
                Err(e) => log::warn!("{} failed: {}", addr, e),
            }
        });
    }
}
