use axum::extract::{Form, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ember_api::{ApiClient, ApiConfig, ApiError, NotificationSettings, Role, Session, SessionStore};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Could not validate credentials"}))).into_response()
}

fn user_json(role: &str) -> serde_json::Value {
    json!({
        "user_id": "5f0c6f1e-0000-0000-0000-000000000001",
        "username": format!("{role}-name"),
        "email": format!("{role}@example.com"),
        "role": role,
        "created_at": "2025-01-01T00:00:00",
        "updated_at": "2025-01-01T00:00:00"
    })
}

async fn login(Form(form): Form<LoginForm>) -> Response {
    match (form.username.as_str(), form.password.as_str()) {
        ("admin@example.com", "secret") => {
            Json(json!({"access_token": "tok-admin", "token_type": "bearer"})).into_response()
        }
        ("user@example.com", "secret") => {
            Json(json!({"access_token": "tok-user", "token_type": "bearer"})).into_response()
        }
        _ => unauthorized(),
    }
}

async fn me(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some("tok-admin") => Json(user_json("admin")).into_response(),
        Some("tok-user") => Json(user_json("user")).into_response(),
        _ => unauthorized(),
    }
}

async fn videos(headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    Json(json!([{
        "video_id": "v1",
        "video_type": "youtube",
        "youtube_url": "https://youtu.be/dQw4w9WgXcQ",
        "original_video_url": "https://res.cloudinary.com/demo/video/upload/v1/a.mp4",
        "processed_video_url": "https://res.cloudinary.com/demo/video/upload/v1/b.mp4",
        "status": "completed",
        "fire_detected": true,
        "created_at": "2025-01-01T00:00:00"
    }]))
    .into_response()
}

async fn user_history(Path(user_id): Path<String>, Query(query): Query<HashMap<String, String>>) -> Response {
    Json(json!([{
        "history_id": "h1",
        "action_type": "query",
        "description": format!("{} skip={} limit={}", user_id, query["skip"], query["limit"]),
        "user_id": user_id
    }]))
    .into_response()
}

async fn change_password(Json(body): Json<serde_json::Value>) -> Response {
    if body["current_password"] == "secret" {
        Json(json!({"message": "ok"})).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"detail": "Incorrect password"}))).into_response()
    }
}

async fn get_settings() -> Json<serde_json::Value> {
    Json(json!({"enable_email_notification": true, "enable_website_notification": false}))
}

async fn set_settings(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    Json(body)
}

async fn serve() -> String {
    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/change-password", post(change_password))
        .route("/api/v1/users/me", get(me))
        .route("/api/v1/videos", get(videos))
        .route("/api/v1/history/:user_id", get(user_history))
        .route("/api/v1/notifications/settings", get(get_settings).post(set_settings));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn expired_session() -> Session {
    Session {
        token: Some("expired".into()),
        authenticated: true,
        role: Some(Role::User),
        email: Some("user@example.com".into()),
    }
}

#[tokio::test]
async fn test_login_fetches_role_and_persists() {
    let base = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("ember").join("session.json"));
    let mut client =
        ApiClient::with_store(ApiConfig::default().with_base_url(&base), store.clone()).unwrap();

    let session = client.login("admin@example.com", "secret").await.unwrap();
    assert!(session.authenticated);
    assert_eq!(session.role, Some(Role::Admin));
    assert_eq!(session.token.as_deref(), Some("tok-admin"));
    assert_eq!(store.load(), *client.session());
}

#[tokio::test]
async fn test_bad_credentials() {
    let base = serve().await;
    let mut client =
        ApiClient::new(ApiConfig::default().with_base_url(&base), Session::default()).unwrap();

    let result = client.login("user@example.com", "wrong").await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
    assert!(!client.session().authenticated);
}

#[tokio::test]
async fn test_unauthorized_response_logs_out() {
    let base = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    store.save(&expired_session()).unwrap();
    let mut client =
        ApiClient::with_store(ApiConfig::default().with_base_url(&base), store.clone()).unwrap();
    assert!(client.session().authenticated);

    assert!(matches!(client.me().await, Err(ApiError::Unauthorized)));
    assert_eq!(*client.session(), Session::default());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_role_gating_happens_before_request() {
    // Nothing listens here; a request would fail with a network error
    let config = ApiConfig::default().with_base_url("http://127.0.0.1:9");
    let mut guest = ApiClient::new(config.clone(), Session::default()).unwrap();
    assert!(matches!(guest.videos().await, Err(ApiError::Unauthorized)));

    let user = Session {
        token: Some("tok-user".into()),
        authenticated: true,
        role: Some(Role::User),
        email: None,
    };
    let mut client = ApiClient::new(config, user).unwrap();
    assert!(matches!(client.users().await, Err(ApiError::Forbidden(_))));
    assert!(matches!(client.all_videos().await, Err(ApiError::Forbidden(_))));
    assert!(matches!(client.user_history("u1").await, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_videos_and_history() {
    let base = serve().await;
    let mut client =
        ApiClient::new(ApiConfig::default().with_base_url(&base), Session::default()).unwrap();
    client.login("admin@example.com", "secret").await.unwrap();

    let videos = client.videos().await.unwrap();
    assert_eq!(videos.len(), 1);
    assert!(videos[0].fire_detected);
    assert_eq!(
        ember_api::download_url(videos[0].processed_video_url.as_deref().unwrap()),
        "https://res.cloudinary.com/demo/video/upload/fl_attachment/v1/b.mp4"
    );

    let history = client.user_history("u42").await.unwrap();
    assert_eq!(history[0].description.as_deref(), Some("u42 skip=0 limit=1000"));
}

#[tokio::test]
async fn test_change_password() {
    let base = serve().await;
    let mut client =
        ApiClient::new(ApiConfig::default().with_base_url(&base), Session::default()).unwrap();
    client.login("user@example.com", "secret").await.unwrap();

    assert!(matches!(
        client.change_password("secret", "n1", "n2").await,
        Err(ApiError::Validation(_))
    ));
    match client.change_password("wrong", "n1", "n1").await {
        Err(ApiError::Http { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Incorrect password");
        }
        other => panic!("unexpected {other:?}"),
    }
    client.change_password("secret", "n1", "n1").await.unwrap();
}

#[tokio::test]
async fn test_notification_settings() {
    let base = serve().await;
    let mut client =
        ApiClient::new(ApiConfig::default().with_base_url(&base), Session::default()).unwrap();
    client.login("user@example.com", "secret").await.unwrap();

    let settings = client.notification_settings().await.unwrap();
    assert!(settings.enable_email_notification);
    let updated = client
        .set_notification_settings(&NotificationSettings {
            enable_email_notification: false,
            enable_website_notification: true,
        })
        .await
        .unwrap();
    assert!(updated.enable_website_notification);
}
