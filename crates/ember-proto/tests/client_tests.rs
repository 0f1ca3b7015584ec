use ember_proto::{AuthMessage, CameraFrame, CameraMessage, CameraStatus, JobMetadata};
use serde_json::{Value, json};

fn as_value(text: &str) -> Value {
    serde_json::from_str(text).expect("valid json")
}

#[test]
fn test_auth_message_shapes() {
    let with_token = AuthMessage::new(Some("abc".into())).to_json().unwrap();
    assert_eq!(as_value(&with_token), json!({"token": "abc"}));

    let anonymous = AuthMessage::anonymous().to_json().unwrap();
    assert_eq!(as_value(&anonymous), json!({"token": null}));
}

#[test]
fn test_job_metadata_field_names() {
    let upload = JobMetadata::Upload {
        file_name: "fire.mp4".into(),
    };
    assert_eq!(
        as_value(&upload.to_json().unwrap()),
        json!({"type": "upload", "fileName": "fire.mp4"})
    );

    let youtube = JobMetadata::YouTube {
        youtube_url: "https://youtu.be/abcdefghijk".into(),
    };
    assert_eq!(
        as_value(&youtube.to_json().unwrap()),
        json!({"type": "youtube", "youtube_url": "https://youtu.be/abcdefghijk"})
    );

    let info = JobMetadata::ChunkInfo {
        total_chunks: 4,
        file_size: 20 * 1024 * 1024,
        file_name: "big.mp4".into(),
        mime_type: "video/mp4".into(),
    };
    assert_eq!(
        as_value(&info.to_json().unwrap()),
        json!({"type": "chunk_info", "totalChunks": 4, "fileSize": 20971520, "fileName": "big.mp4", "mimeType": "video/mp4"})
    );

    let meta = JobMetadata::ChunkMeta {
        chunk_index: 3,
        total_chunks: 4,
        chunk_size: 1024,
    };
    assert_eq!(
        as_value(&meta.to_json().unwrap()),
        json!({"type": "chunk_meta", "chunkIndex": 3, "totalChunks": 4, "chunkSize": 1024})
    );
}

#[test]
fn test_camera_message_discriminates_status_from_frame() {
    let ready = CameraMessage::from_json(r#"{"status":"ready","message":"Camera ready"}"#).unwrap();
    assert_eq!(
        ready,
        CameraMessage::Status(CameraStatus::Ready {
            message: "Camera ready".into()
        })
    );

    let text = r#"{"frame_idx":7,"time":"10:15:02 19/10/2026","fire_detected":true,"total_area":12.3456,"frame":"/9j/AA=="}"#;
    match CameraMessage::from_json(text).unwrap() {
        CameraMessage::Frame(frame) => {
            assert_eq!(frame.frame_idx, 7);
            assert!(frame.fire_detected);
            assert_eq!(frame.image_bytes().unwrap(), vec![0xff, 0xd8, 0xff, 0x00]);
        }
        other => panic!("expected frame, got {:?}", other),
    }
}

#[test]
fn test_camera_frame_rejects_bad_base64() {
    let frame = CameraFrame {
        frame_idx: 0,
        time: String::new(),
        fire_detected: false,
        total_area: 0.0,
        frame: "***".into(),
    };
    assert!(frame.image_bytes().is_err());
}

#[test]
fn test_camera_frame_new_encodes_jpeg() {
    let frame = CameraFrame::new(1, "now".into(), false, 0.0, &[1, 2, 3]);
    assert_eq!(frame.image_bytes().unwrap(), vec![1, 2, 3]);
}
