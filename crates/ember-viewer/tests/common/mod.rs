#![allow(dead_code)]

use ember_com::{Channel, MemoryChannel, WireMessage};
use ember_viewer::{
    AlertSink, Alerts, Frame, FrameSink, SessionHandle, Speaker, Utterance, ViewerConfig,
    ViewerError, ViewerSnapshot,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

pub const YOUTUBE_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Short timers so tests finish quickly.
pub fn fast_config() -> ViewerConfig {
    ViewerConfig::default()
        .with_pace_interval(Duration::from_millis(5))
        .with_clock_interval(Duration::from_millis(50))
        .with_alert_dismiss(Duration::from_millis(30))
}

/// Everything the alert outputs were asked to do, in order.
#[derive(Clone, Default)]
pub struct AlertLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl AlertLog {
    pub fn alerts(&self) -> Alerts {
        Alerts::new(Box::new(self.clone()), Box::new(self.clone()))
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

impl Speaker for AlertLog {
    fn speak(&mut self, utterance: &Utterance) {
        self.events
            .lock()
            .unwrap()
            .push(format!("speak:{}:{}", utterance.lang, utterance.text));
    }
}

impl AlertSink for AlertLog {
    fn show_banner(&mut self, text: &str) {
        self.events.lock().unwrap().push(format!("show:{text}"));
    }

    fn hide_banner(&mut self) {
        self.events.lock().unwrap().push("hide".to_string());
    }
}

/// Sink that remembers the sequence numbers it was shown.
#[derive(Clone, Default)]
pub struct RecordingSink {
    shown: Arc<Mutex<Vec<u64>>>,
    clears: Arc<Mutex<usize>>,
    closed: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn shown(&self) -> Vec<u64> {
        self.shown.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock().unwrap()
    }

    /// Act like a window the user just closed.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl FrameSink for RecordingSink {
    fn show(&mut self, frame: &Frame) -> Result<(), ViewerError> {
        self.shown.lock().unwrap().push(frame.seq());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ViewerError> {
        *self.clears.lock().unwrap() += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

pub async fn recv(peer: &mut MemoryChannel) -> WireMessage {
    timeout(Duration::from_secs(5), peer.recv())
        .await
        .expect("recv timed out")
        .expect("recv failed")
}

pub async fn recv_json(peer: &mut MemoryChannel) -> serde_json::Value {
    match recv(peer).await {
        WireMessage::Text(text) => serde_json::from_str(&text).expect("invalid json"),
        WireMessage::Binary(data) => panic!("expected text, got {} bytes", data.len()),
    }
}

pub async fn send_json(peer: &mut MemoryChannel, value: serde_json::Value) {
    peer.send(WireMessage::Text(value.to_string()))
        .await
        .expect("send failed");
}

pub fn frame_status(fire_detected: bool, total_area: f64, video_time: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "frame",
        "frame_info": {
            "frame": 1,
            "video_time": video_time,
            "fire_detected": fire_detected,
            "total_area": total_area,
            "confidence": 0.9
        }
    })
}

/// Wait until a published snapshot satisfies `pred`.
pub async fn wait_for(handle: &SessionHandle, pred: impl Fn(&ViewerSnapshot) -> bool) {
    let mut rx = handle.subscribe();
    timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
        .await
        .expect("condition not reached")
        .expect("session gone");
}
