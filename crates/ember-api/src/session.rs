use crate::ApiError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Account role reported by `/users/me`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse the backend's role string. Anything unknown is a plain user.
    pub fn parse(role: &str) -> Self {
        if role.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// Process-wide auth context.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    /// Bearer token, if logged in.
    pub fn require_authenticated(&self) -> Result<&str, ApiError> {
        match (&self.token, self.authenticated) {
            (Some(token), true) => Ok(token),
            _ => Err(ApiError::Unauthorized),
        }
    }

    pub fn require_admin(&self) -> Result<&str, ApiError> {
        let token = self.require_authenticated()?;
        if self.role == Some(Role::Admin) {
            Ok(token)
        } else {
            Err(ApiError::Forbidden("admin role required".to_string()))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.authenticated && self.role == Some(Role::Admin)
    }

    /// Token for the streaming endpoints; guests join anonymously.
    pub fn stream_token(&self) -> Option<String> {
        if self.authenticated { self.token.clone() } else { None }
    }

    pub fn clear(&mut self) {
        *self = Session::default();
    }
}

/// Persists the [`Session`] as JSON between runs.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/ember/session.json`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ember")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing or unreadable file is a logged-out
    /// session.
    pub fn load(&self) -> Session {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("failed to read {}: {}", self.path.display(), e);
                }
                return Session::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(e) => {
                log::warn!("ignoring corrupt session file {}: {}", self.path.display(), e);
                Session::default()
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
