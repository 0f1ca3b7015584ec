mod common;

use common::*;
use ember_com::{Channel, ComError, MemoryChannel, MemoryConnector, WireMessage};
use ember_proto::{CameraFrame, CameraMessage};
use ember_viewer::{Alerts, CameraController, Mode, Phase};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

fn camera_frame(idx: u64, time: &str, fire: bool, area: f64) -> WireMessage {
    let frame = CameraFrame::new(idx, time.to_string(), fire, area, &[0xff, 0xd8, idx as u8]);
    WireMessage::Text(CameraMessage::Frame(frame).to_json().unwrap())
}

#[tokio::test]
async fn test_start_is_noop_while_running() {
    let (client, _peer) = MemoryChannel::pair();
    // Only one channel: a second connect would fail
    let connector = MemoryConnector::new(vec![client]);
    let (mut camera, _handle) =
        CameraController::new(connector, fast_config(), RecordingSink::default(), Alerts::default());

    camera.start().await.unwrap();
    assert!(camera.is_running());
    camera.start().await.unwrap();
    assert!(camera.is_running());
    assert_eq!(camera.snapshot().mode, Mode::Camera);
}

#[tokio::test]
async fn test_frames_shown_immediately_and_stop_via_handle() {
    let (client, mut peer) = MemoryChannel::pair();
    let sink = RecordingSink::default();
    let (mut camera, handle) = CameraController::new(
        MemoryConnector::new(vec![client]),
        fast_config(),
        sink.clone(),
        Alerts::default(),
    );
    camera.start().await.unwrap();

    let script = async {
        send_json(&mut peer, json!({"status": "ready"})).await;
        peer.send(camera_frame(1, "10:00:01", false, 2.5)).await.unwrap();
        peer.send(camera_frame(2, "10:00:02", true, 40.0)).await.unwrap();
        wait_for(&handle, |s| s.frames_displayed == 2).await;
        let s = handle.snapshot();
        assert_eq!(s.phase, Phase::Processing);
        assert_eq!(s.fire, 40.0);
        assert_eq!(s.background, 60.0);
        assert_eq!(s.last_detection.as_deref(), Some("10:00:02"));
        handle.stop();
    };

    let (phase, ()) = tokio::join!(camera.pump(), script);
    assert_eq!(phase, Phase::Closed);
    assert!(!camera.is_running());
    assert_eq!(sink.shown(), vec![0, 1]);
    assert_eq!(sink.clears(), 1);

    // The backend is told to stop, then the channel closes
    assert_eq!(recv(&mut peer).await, WireMessage::Text("stop".into()));
    assert!(matches!(peer.recv().await, Err(ComError::ConnectionClosed)));

    let s = camera.snapshot();
    assert_eq!(s.current_frame, None);
    assert_eq!(s.status_line, "camera off");
    assert_eq!(s.frames_released, 2);
}

#[tokio::test]
async fn test_alert_latch_survives_restart() {
    let (first, mut first_peer) = MemoryChannel::pair();
    let (second, mut second_peer) = MemoryChannel::pair();
    let alerts = AlertLog::default();
    let config = fast_config().with_notifications(true);
    let (mut camera, _handle) = CameraController::new(
        MemoryConnector::new(vec![first, second]),
        config,
        RecordingSink::default(),
        alerts.alerts(),
    );

    camera.start().await.unwrap();
    first_peer.send(camera_frame(1, "10:00:01", true, 5.0)).await.unwrap();
    first_peer.close().await.unwrap();
    let phase = timeout(Duration::from_secs(5), camera.pump()).await.unwrap();
    assert_eq!(phase, Phase::Closed);
    camera.stop().await;

    camera.start().await.unwrap();
    second_peer.send(camera_frame(1, "10:05:00", true, 9.0)).await.unwrap();
    second_peer.close().await.unwrap();
    timeout(Duration::from_secs(5), camera.pump()).await.unwrap();

    let s = camera.snapshot();
    assert_eq!(s.detections, 2);
    assert_eq!(s.last_detection.as_deref(), Some("10:05:00"));
    assert_eq!(alerts.count("show:"), 1);
    assert_eq!(alerts.count("speak:"), 1);
}

#[tokio::test]
async fn test_camera_error_ends_pump() {
    let (client, mut peer) = MemoryChannel::pair();
    let (mut camera, _handle) = CameraController::new(
        MemoryConnector::new(vec![client]),
        fast_config(),
        RecordingSink::default(),
        Alerts::default(),
    );
    camera.start().await.unwrap();
    peer.send(WireMessage::Text("garbage".into())).await.unwrap();
    send_json(&mut peer, json!({"status": "error", "message": "camera unavailable"})).await;

    let phase = timeout(Duration::from_secs(5), camera.pump()).await.unwrap();
    assert_eq!(phase, Phase::Failed);
    let s = camera.snapshot();
    assert_eq!(s.error.as_deref(), Some("camera unavailable"));
    assert!(!camera.is_running());
}

#[tokio::test]
async fn test_connect_failure_reported() {
    let (mut camera, handle) = CameraController::new(
        MemoryConnector::new(Vec::new()),
        fast_config(),
        RecordingSink::default(),
        Alerts::default(),
    );

    assert!(camera.start().await.is_err());
    assert!(!camera.is_running());
    let s = handle.snapshot();
    assert_eq!(s.phase, Phase::Failed);
    assert!(s.status_line.contains("connection failed"));
}

#[tokio::test]
async fn test_closing_display_stops_camera() {
    let (client, mut peer) = MemoryChannel::pair();
    let sink = RecordingSink::default();
    let (mut camera, handle) = CameraController::new(
        MemoryConnector::new(vec![client]),
        fast_config(),
        sink.clone(),
        Alerts::default(),
    );
    camera.start().await.unwrap();

    let script = async {
        send_json(&mut peer, json!({"status": "ready"})).await;
        peer.send(camera_frame(1, "10:00:01", false, 2.5)).await.unwrap();
        wait_for(&handle, |s| s.frames_displayed == 1).await;
        sink.close();
        assert_eq!(recv(&mut peer).await, WireMessage::Text("stop".into()));
    };

    let (phase, ()) = timeout(Duration::from_secs(5), async {
        tokio::join!(camera.pump(), script)
    })
    .await
    .expect("camera kept running after the display closed");
    assert_eq!(phase, Phase::Closed);
    assert!(!camera.is_running());
    assert_eq!(camera.snapshot().status_line, "camera off");
}
