use crate::alert::Alerts;
use crate::config::ViewerConfig;
use crate::job::PreparedJob;
use crate::sink::FrameSink;
use crate::state::{Outcome, Phase, ViewerSnapshot, ViewerState};
use crate::upload::{Ack, Uploader};
use ember_base::{Epoch, Stamped};
use ember_com::{Channel, ComError, WireMessage};
use ember_proto::{AuthMessage, ProtoError, StatusMessage};
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};

/// Local wall clock as `HH:MM:SS`.
pub(crate) fn local_clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Observer and stop switch for a running session or camera.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    epoch: Epoch,
    stop: Arc<Notify>,
    snapshot: watch::Receiver<ViewerSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(
        epoch: Epoch,
        stop: Arc<Notify>,
        snapshot: watch::Receiver<ViewerSnapshot>,
    ) -> Self {
        Self {
            epoch,
            stop,
            snapshot,
        }
    }

    /// Tear the session down. Messages already received but not yet applied
    /// are discarded.
    pub fn stop(&self) {
        let epoch = self.epoch.advance();
        log::debug!("stop requested, epoch now {}", epoch);
        self.stop.notify_one();
    }

    /// Latest published state.
    pub fn snapshot(&self) -> ViewerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that is notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<ViewerSnapshot> {
        self.snapshot.clone()
    }
}

/// Why the transfer phase ended early.
enum Halt {
    Stopped,
    Closed,
    Failed(String),
}

impl From<ComError> for Halt {
    fn from(err: ComError) -> Self {
        match err {
            ComError::ConnectionClosed => Halt::Closed,
            other => Halt::Failed(format!("connection error: {other}")),
        }
    }
}

/// Drives one job on the direct-process channel: authenticate, send the job,
/// transfer the payload, then play back results until the job ends.
pub struct VideoSession<C: Channel, S: FrameSink> {
    channel: C,
    open: bool,
    token: Option<String>,
    config: ViewerConfig,
    uploader: Uploader,
    state: ViewerState,
    sink: S,
    alerts: Alerts,
    epoch: Epoch,
    generation: u64,
    stop_signal: Arc<Notify>,
    snapshot_tx: watch::Sender<ViewerSnapshot>,
}

impl<C: Channel, S: FrameSink> VideoSession<C, S> {
    /// Create a session over an already connected channel.
    pub fn new(channel: C, config: ViewerConfig, sink: S, alerts: Alerts) -> (Self, SessionHandle) {
        Self::with_token(channel, config, sink, alerts, None)
    }

    /// Like `new`, authenticating with `token`. `None` joins as a guest.
    pub fn with_token(
        channel: C,
        config: ViewerConfig,
        sink: S,
        alerts: Alerts,
        token: Option<String>,
    ) -> (Self, SessionHandle) {
        let epoch = Epoch::new();
        let stop_signal = Arc::new(Notify::new());
        let state = ViewerState::new(&config);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let handle = SessionHandle::new(epoch.clone(), stop_signal.clone(), snapshot_rx);
        let session = Self {
            channel,
            open: true,
            token,
            uploader: Uploader::from_config(&config),
            config,
            state,
            sink,
            alerts,
            generation: epoch.current(),
            epoch,
            stop_signal,
            snapshot_tx,
        };
        (session, handle)
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn stopped(&self) -> bool {
        !self.epoch.is_current(self.generation)
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.snapshot());
    }

    /// Unwrap `stamped` only if it belongs to this session's live epoch.
    fn accept<T>(&self, stamped: Stamped<T>) -> Option<T> {
        if stamped.epoch != self.generation {
            return None;
        }
        self.epoch.accept(stamped)
    }

    /// Run `job` to the end and return the final state.
    ///
    /// Transport and backend failures end up in the snapshot's status line
    /// and error fields; they are not returned.
    pub async fn run(&mut self, job: PreparedJob) -> ViewerSnapshot {
        if !self.stopped() {
            self.publish();
            match self.transfer(&job).await {
                Ok(()) => self.play().await,
                Err(Halt::Stopped) => log::info!("session stopped during transfer"),
                Err(Halt::Closed) => {
                    self.open = false;
                    self.state.channel_closed();
                }
                Err(Halt::Failed(message)) => {
                    if self.state.phase() != Phase::Failed {
                        self.state.fail(message);
                    }
                }
            }
        }
        self.teardown().await;
        self.state.snapshot()
    }

    async fn send_text(&mut self, text: Result<String, ProtoError>) -> Result<(), Halt> {
        let text = text.map_err(|e| Halt::Failed(format!("failed to encode message: {e}")))?;
        self.channel.send(WireMessage::Text(text)).await?;
        Ok(())
    }

    async fn transfer(&mut self, job: &PreparedJob) -> Result<(), Halt> {
        self.send_text(AuthMessage::new(self.token.clone()).to_json())
            .await?;
        let metadata = self.uploader.opening_metadata(job);
        self.send_text(metadata.to_json()).await?;
        log::info!("job sent: {:?}", metadata);
        self.state.set_status("connected, processing");

        let Some(payload) = job.payload() else {
            self.publish();
            return Ok(());
        };
        self.state.set_phase(Phase::Transferring);
        self.publish();
        let total = payload.len() as u64;

        match self.uploader {
            Uploader::Single => {
                self.channel
                    .send(WireMessage::Binary(payload.to_vec()))
                    .await?;
                self.state.upload_progress(total, total);
                log::info!("uploaded {} bytes", total);
            }
            Uploader::Chunked { .. } => {
                self.await_ack(Ack::Ready).await?;
                let chunks = self.uploader.chunks(payload);
                let total_chunks = chunks.len() as u32;
                let mut sent = 0u64;
                for (index, chunk) in chunks {
                    let meta = self.uploader.chunk_meta(index, total_chunks, chunk);
                    self.send_text(meta.to_json()).await?;
                    self.await_ack(Ack::ChunkReady).await?;
                    self.channel.send(WireMessage::Binary(chunk.to_vec())).await?;
                    sent += chunk.len() as u64;
                    self.state.upload_progress(sent, total);
                    self.state
                        .set_status(format!("sent chunk {}/{}", index + 1, total_chunks));
                    self.publish();
                    log::debug!("sent chunk {}/{} ({} bytes)", index + 1, total_chunks, chunk.len());
                }
            }
        }
        self.state.set_status("upload finished, waiting for results");
        self.publish();
        Ok(())
    }

    /// Wait for `ack`, applying whatever else arrives in the meantime.
    async fn await_ack(&mut self, ack: Ack) -> Result<(), Halt> {
        loop {
            let received = tokio::select! {
                _ = self.stop_signal.notified() => {
                    if self.stopped() {
                        return Err(Halt::Stopped);
                    }
                    continue;
                }
                received = self.channel.recv() => received?,
            };
            let Some(message) = self.accept(self.epoch.stamp(received)) else {
                return Err(Halt::Stopped);
            };
            match message {
                WireMessage::Binary(data) => self.state.push_frame(data),
                WireMessage::Text(text) => match StatusMessage::from_json(&text) {
                    Ok(status) if ack.matches(&status) => {
                        log::trace!("got {}", status.tag());
                        return Ok(());
                    }
                    Ok(status) => {
                        if let Outcome::Failed(message) = self.apply(status) {
                            self.publish();
                            return Err(Halt::Failed(message));
                        }
                    }
                    Err(e) => log::warn!("skipping malformed message: {}", e),
                },
            }
            self.publish();
        }
    }

    fn apply(&mut self, status: StatusMessage) -> Outcome {
        let outcome = self.state.apply_status(status);
        self.handle_outcome(&outcome);
        outcome
    }

    fn handle_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::FireAlert => self.alerts.raise(
                self.config.banner_text(),
                self.config.utterance(),
                self.config.alert_dismiss(),
            ),
            Outcome::Completed => log::info!("processing complete"),
            Outcome::Failed(_) | Outcome::None => {}
        }
    }

    fn handle_message(&mut self, message: WireMessage) {
        match message {
            WireMessage::Binary(data) => self.state.push_frame(data),
            WireMessage::Text(text) => match StatusMessage::from_json(&text) {
                Ok(status) => {
                    self.apply(status);
                }
                Err(e) => log::warn!("skipping malformed message: {}", e),
            },
        }
    }

    /// Receive and play back results. Ends on stop or when the sink closes,
    /// or once the job has finished (or the channel closed) and the queue
    /// has drained.
    async fn play(&mut self) {
        let mut pace = interval(self.config.pace_interval());
        pace.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = interval(self.config.clock_interval());
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let finished = !self.open || self.state.phase().is_terminal();
            if finished && self.state.pacer().queued() == 0 {
                break;
            }
            let deadline = self.alerts.dismiss_deadline();
            tokio::select! {
                _ = self.stop_signal.notified() => {
                    if self.stopped() {
                        log::info!("session stopped");
                        break;
                    }
                }
                received = self.channel.recv(), if self.open => match received {
                    Ok(message) => {
                        if let Some(message) = self.accept(self.epoch.stamp(message)) {
                            self.handle_message(message);
                        }
                    }
                    Err(ComError::ConnectionClosed) => {
                        log::info!("channel closed by peer");
                        self.open = false;
                        self.state.channel_closed();
                    }
                    Err(e) => {
                        self.open = false;
                        self.state.fail(format!("connection error: {e}"));
                    }
                },
                _ = pace.tick() => self.state.tick(&mut self.sink),
                _ = clock.tick() => self.state.clock_tick(local_clock()),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.alerts.dismiss();
                    self.state.hide_banner();
                }
            }
            if self.stopped() {
                continue;
            }
            if !self.sink.is_open() {
                log::info!("display closed, stopping session");
                self.state.set_status("display closed");
                break;
            }
            self.publish();
        }
    }

    async fn teardown(&mut self) {
        self.epoch.advance();
        if self.open {
            self.open = false;
            if let Err(e) = self.channel.close().await {
                log::debug!("close failed: {}", e);
            }
        }
        self.alerts.dismiss();
        self.state.teardown();
        self.publish();
        log::debug!("session torn down");
    }
}
