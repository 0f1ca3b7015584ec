use crate::ViewerError;
use crate::alert::Alerts;
use crate::config::{Mode, ViewerConfig};
use crate::session::{SessionHandle, local_clock};
use crate::sink::FrameSink;
use crate::state::{Outcome, Phase, ViewerSnapshot, ViewerState};
use ember_base::Epoch;
use ember_com::{Channel, ComError, Connector, WireMessage};
use ember_proto::{CameraMessage, STOP_COMMAND};
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};

/// Live camera view on the fire endpoint.
///
/// The camera is switched on and off explicitly with `start` and `stop`;
/// `pump` consumes frames while it is on. Detection timeline and alert latch
/// live as long as the controller, so switching the camera off and on again
/// does not re-arm the alert.
pub struct CameraController<K: Connector, S: FrameSink> {
    connector: K,
    channel: Option<K::Channel>,
    config: ViewerConfig,
    state: ViewerState,
    sink: S,
    alerts: Alerts,
    epoch: Epoch,
    generation: u64,
    stop_signal: Arc<Notify>,
    snapshot_tx: watch::Sender<ViewerSnapshot>,
}

impl<K: Connector, S: FrameSink> CameraController<K, S> {
    pub fn new(connector: K, config: ViewerConfig, sink: S, alerts: Alerts) -> (Self, SessionHandle) {
        let config = config.with_mode(Mode::Camera);
        let epoch = Epoch::new();
        let stop_signal = Arc::new(Notify::new());
        let mut state = ViewerState::new(&config);
        state.set_status("camera off");
        state.teardown();
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let handle = SessionHandle::new(epoch.clone(), stop_signal.clone(), snapshot_rx);
        let controller = Self {
            connector,
            channel: None,
            config,
            state,
            sink,
            alerts,
            generation: epoch.current(),
            epoch,
            stop_signal,
            snapshot_tx,
        };
        (controller, handle)
    }

    pub fn is_running(&self) -> bool {
        self.channel.is_some()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        self.state.snapshot()
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.snapshot());
    }

    /// Switch the camera on. Does nothing while it is already on.
    pub async fn start(&mut self) -> Result<(), ViewerError> {
        if self.is_running() {
            log::debug!("camera already running");
            return Ok(());
        }
        self.generation = self.epoch.advance();
        self.state.restart();
        self.publish();

        match self.connector.connect().await {
            Ok(channel) => {
                log::info!("camera channel open");
                self.channel = Some(channel);
                self.state.set_status("connected");
                self.publish();
                Ok(())
            }
            Err(e) => {
                self.state.fail(format!("connection failed: {e}"));
                self.state.teardown();
                self.publish();
                Err(e.into())
            }
        }
    }

    /// Switch the camera off: ask the backend to stop, close the channel and
    /// blank the display.
    pub async fn stop(&mut self) {
        self.epoch.advance();
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.send(WireMessage::Text(STOP_COMMAND.to_string())).await {
                log::debug!("failed to send stop: {}", e);
            }
            if let Err(e) = channel.close().await {
                log::debug!("close failed: {}", e);
            }
            log::info!("camera stopped");
        }
        self.alerts.dismiss();
        self.state.hide_banner();
        self.state.clear_display(&mut self.sink);
        self.state.set_status("camera off");
        self.state.teardown();
        self.publish();
    }

    /// Consume camera messages until the camera is stopped through the
    /// handle or by closing the display, the backend reports an error, or
    /// the channel closes.
    /// Returns the phase the camera ended in.
    ///
    /// Cancel-safe: dropping the future leaves the camera running.
    pub async fn pump(&mut self) -> Phase {
        let mut clock = interval(self.config.clock_interval());
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if !self.sink.is_open() {
                log::info!("display closed, stopping camera");
                self.stop().await;
                return self.state.phase();
            }
            let Some(channel) = self.channel.as_mut() else {
                return self.state.phase();
            };
            let deadline = self.alerts.dismiss_deadline();
            tokio::select! {
                _ = self.stop_signal.notified() => {
                    if !self.epoch.is_current(self.generation) {
                        self.stop().await;
                        return self.state.phase();
                    }
                }
                received = channel.recv() => match received {
                    Ok(message) => {
                        let stamped = self.epoch.stamp(message);
                        if stamped.epoch != self.generation {
                            continue;
                        }
                        if let Some(message) = self.epoch.accept(stamped) {
                            self.handle_message(message).await;
                        }
                    }
                    Err(ComError::ConnectionClosed) => {
                        log::info!("camera channel closed by peer");
                        self.channel = None;
                        self.state.channel_closed();
                    }
                    Err(e) => {
                        self.channel = None;
                        self.state.fail(format!("connection error: {e}"));
                    }
                },
                _ = clock.tick() => self.state.clock_tick(local_clock()),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.alerts.dismiss();
                    self.state.hide_banner();
                }
            }
            self.publish();
        }
    }

    async fn handle_message(&mut self, message: WireMessage) {
        let text = match message {
            WireMessage::Text(text) => text,
            WireMessage::Binary(data) => {
                log::debug!("ignoring {} byte binary message on camera channel", data.len());
                return;
            }
        };
        let message = match CameraMessage::from_json(&text) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("skipping malformed camera message: {}", e);
                return;
            }
        };
        match self.state.apply_camera(message, &mut self.sink) {
            Outcome::FireAlert => self.alerts.raise(
                self.config.banner_text(),
                self.config.utterance(),
                self.config.alert_dismiss(),
            ),
            Outcome::Failed(message) => {
                log::error!("camera error: {}", message);
                if let Some(mut channel) = self.channel.take() {
                    if let Err(e) = channel.close().await {
                        log::debug!("close failed: {}", e);
                    }
                }
            }
            Outcome::Completed | Outcome::None => {}
        }
    }
}
