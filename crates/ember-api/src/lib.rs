//! REST client for the fire-detection backend: authentication, account,
//! video and history queries, user administration and notification settings.

pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod session;
pub mod validate;

pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use media::{download_url, inline_url};
pub use models::{FireDetection, HistoryEntry, NewUser, NotificationSettings, Token, User, UserUpdate, Video};
pub use session::{Role, Session, SessionStore};
pub use validate::{validate_email, validate_password_change};
