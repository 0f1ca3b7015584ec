use clap::{ArgGroup, Args};
use ember_api::{ApiClient, download_url};
use ember_base::log;
use ember_com::{ChannelConfig, WsChannel, WsConnector};
use ember_viewer::{
    AlertSink, Alerts, CameraController, CommandSpeaker, DirectorySink, FrameSink, JobSource, LogSpeaker,
    NullSink, Phase, SessionHandle, ValidationLimits, VideoSession, ViewerConfig, ViewerError, ViewerSnapshot,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Display and alert options shared by `analyze` and `camera`.
#[derive(Args)]
pub(crate) struct OutputArgs {
    /// Always raise the fire alert, regardless of the account setting
    #[arg(long)]
    notify: bool,

    /// Speak the alert with this TTS program (e.g. espeak-ng)
    #[arg(long)]
    tts: Option<String>,

    /// Write displayed frames into this directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Show frames in a window
    #[arg(long)]
    window: bool,
}

#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
pub(crate) struct AnalyzeArgs {
    /// Video file to upload
    #[arg(long)]
    file: Option<PathBuf>,

    /// YouTube video URL
    #[arg(long)]
    url: Option<String>,

    /// Upload in acknowledged chunks
    #[arg(long)]
    chunked: bool,

    /// Chunk size in MiB
    #[arg(long, default_value_t = 5)]
    chunk_mib: usize,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
pub(crate) struct CameraArgs {
    /// Switch the camera off after this many seconds
    #[arg(long)]
    seconds: Option<u64>,

    #[command(flatten)]
    output: OutputArgs,
}

/// Prints banner changes to the terminal.
struct TerminalBanner;

impl AlertSink for TerminalBanner {
    fn show_banner(&mut self, text: &str) {
        eprintln!("\n*** {text} ***\n");
    }

    fn hide_banner(&mut self) {
        log::debug!("banner hidden");
    }
}

impl OutputArgs {
    fn sink(&self) -> Result<Box<dyn FrameSink>, ViewerError> {
        if self.window {
            #[cfg(feature = "window")]
            return Ok(Box::new(ember_viewer::WindowSink::new("fire-watch")));
            #[cfg(not(feature = "window"))]
            log::warn!("built without window support, ignoring --window");
        }
        match &self.out {
            Some(dir) => Ok(Box::new(DirectorySink::create(dir)?)),
            None => Ok(Box::new(NullSink::new())),
        }
    }

    fn alerts(&self) -> Alerts {
        match &self.tts {
            Some(program) => Alerts::new(Box::new(CommandSpeaker::new(program)), Box::new(TerminalBanner)),
            None => Alerts::new(Box::new(LogSpeaker), Box::new(TerminalBanner)),
        }
    }

    /// `--notify`, or the account's website notification setting.
    async fn notifications_enabled(&self, client: &mut ApiClient) -> bool {
        if self.notify {
            return true;
        }
        if !client.session().authenticated {
            return false;
        }
        match client.notification_settings().await {
            Ok(settings) => settings.enable_website_notification,
            Err(e) => {
                log::warn!("could not read notification settings: {}", e);
                false
            }
        }
    }
}

fn stop_on_ctrl_c(handle: SessionHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupted");
            handle.stop();
        }
    })
}

fn status_line(snapshot: &ViewerSnapshot) -> String {
    let mut line = format!(
        "[{:5.1}%] {} | fire {:.2}% background {:.2}% | detections {}",
        snapshot.progress, snapshot.status_line, snapshot.fire, snapshot.background, snapshot.detections
    );
    if let Some(last) = &snapshot.last_detection {
        line.push_str(&format!(" (last {last})"));
    }
    line
}

/// Print the status line whenever it changes.
fn report(handle: &SessionHandle) -> JoinHandle<()> {
    let mut rx = handle.subscribe();
    tokio::spawn(async move {
        let mut last = String::new();
        while rx.changed().await.is_ok() {
            let line = status_line(&rx.borrow_and_update());
            if line != last {
                println!("{line}");
                last = line;
            }
        }
    })
}

fn summarize(snapshot: &ViewerSnapshot) -> Result<(), ViewerError> {
    println!(
        "{:?}: {} frames received, {} displayed, fire detected {} time(s)",
        snapshot.phase, snapshot.frames_received, snapshot.frames_displayed, snapshot.detections
    );
    if let Some(url) = &snapshot.processed_url {
        println!("processed video: {url}");
        println!("download:        {}", download_url(url));
    }
    match &snapshot.error {
        Some(message) => Err(ViewerError::Server(message.clone())),
        None => Ok(()),
    }
}

pub(crate) async fn analyze(client: &mut ApiClient, args: AnalyzeArgs) -> Result<(), ViewerError> {
    let source = match (args.file, args.url) {
        (Some(path), _) => JobSource::Upload(path),
        (None, Some(url)) => JobSource::YouTube(url),
        (None, None) => return Err(ViewerError::InvalidJob("nothing to analyze".to_string())),
    };
    let job = source.prepare(&ValidationLimits::default()).await?;

    let config = ViewerConfig::default()
        .with_chunked(args.chunked)
        .with_chunk_size(args.chunk_mib.max(1) * 1024 * 1024)
        .with_notifications(args.output.notifications_enabled(client).await);
    let sink = args.output.sink()?;
    let alerts = args.output.alerts();

    let url = client.config().direct_process_url();
    log::info!("connecting to {}", url);
    let channel = match WsChannel::connect(&url, &ChannelConfig::default()).await {
        Ok(channel) => channel,
        Err(e) => {
            println!("connection failed: {e}");
            return Err(e.into());
        }
    };

    let token = client.session().stream_token();
    let (mut session, handle) = VideoSession::with_token(channel, config, sink, alerts, token);
    let interrupt = stop_on_ctrl_c(handle.clone());
    let reporter = report(&handle);

    let snapshot = session.run(job).await;

    interrupt.abort();
    reporter.abort();
    summarize(&snapshot)
}

pub(crate) async fn camera(client: &mut ApiClient, args: CameraArgs) -> Result<(), ViewerError> {
    let config = ViewerConfig::default().with_notifications(args.output.notifications_enabled(client).await);
    let connector = WsConnector::new(client.config().camera_url(), ChannelConfig::default());
    let sink = args.output.sink()?;
    let (mut controller, handle) = CameraController::new(connector, config, sink, args.output.alerts());
    let interrupt = stop_on_ctrl_c(handle.clone());
    let reporter = report(&handle);

    if let Err(e) = controller.start().await {
        println!("{}", controller.snapshot().status_line);
        interrupt.abort();
        reporter.abort();
        return Err(e);
    }

    let phase = match args.seconds {
        Some(seconds) => {
            tokio::select! {
                phase = controller.pump() => phase,
                _ = tokio::time::sleep(Duration::from_secs(seconds)) => Phase::Closed,
            }
        }
        None => controller.pump().await,
    };
    log::debug!("camera pump ended in {:?}", phase);
    controller.stop().await;

    interrupt.abort();
    reporter.abort();
    summarize(&controller.snapshot())
}
