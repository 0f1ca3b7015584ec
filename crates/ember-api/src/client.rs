use crate::models::{
    ErrorBody, HistoryEntry, NewUser, NotificationSettings, PasswordChange, Token, User,
    UserUpdate, Video,
};
use crate::session::{Session, SessionStore};
use crate::validate::{validate_email, validate_password_change};
use crate::{ApiConfig, ApiError};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

const LOGIN_PATH: &str = "/api/v1/auth/login";
const REGISTER_PATH: &str = "/api/v1/auth/register";
const CHANGE_PASSWORD_PATH: &str = "/api/v1/auth/change-password";
const ME_PATH: &str = "/api/v1/users/me";
const USERS_PATH: &str = "/api/v1/users";
const VIDEOS_PATH: &str = "/api/v1/videos";
const ALL_VIDEOS_PATH: &str = "/api/v1/videos/all";
const MY_HISTORY_PATH: &str = "/api/v1/history/me";
const NOTIFICATION_SETTINGS_PATH: &str = "/api/v1/notifications/settings";

/// Typed client for the fire-detection REST backend.
///
/// Holds the current [`Session`]. A 401 from any endpoint logs the session
/// out (and clears the store, if one is attached).
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    session: Session,
    store: Option<SessionStore>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            config,
            http,
            session,
            store: None,
        })
    }

    /// Client whose session is loaded from, and saved to, `store`.
    pub fn with_store(config: ApiConfig, store: SessionStore) -> Result<Self, ApiError> {
        let session = store.load();
        let mut client = Self::new(config, session)?;
        client.store = Some(store);
        Ok(client)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn persist(&self) -> Result<(), ApiError> {
        match &self.store {
            Some(store) => store.save(&self.session),
            None => Ok(()),
        }
    }

    /// Drop the session locally. No request is made.
    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.session.clear();
        if let Some(store) = &self.store {
            store.clear()?;
        }
        log::info!("logged out");
        Ok(())
    }

    /// Send `request` and decode a JSON response.
    async fn send<T: DeserializeOwned>(&mut self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("request rejected with 401, clearing session");
            if let Err(e) = self.logout() {
                log::warn!("failed to clear stored session: {}", e);
            }
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => match body.detail {
                    serde_json::Value::String(detail) => detail,
                    other => other.to_string(),
                },
                Err(_) => text,
            };
            log::error!("request failed ({}): {}", status.as_u16(), message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.http.get(self.config.url(path)).bearer_auth(token)
    }

    fn authed_token(&self) -> Result<String, ApiError> {
        self.session.require_authenticated().map(str::to_string)
    }

    fn admin_token(&self) -> Result<String, ApiError> {
        self.session.require_admin().map(str::to_string)
    }

    /// Log in with email and password, then fetch the account role.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ApiError> {
        validate_email(email)?;
        let request = self
            .http
            .post(self.config.url(LOGIN_PATH))
            .form(&[("username", email), ("password", password)]);
        let token: Token = match self.send(request).await {
            Err(ApiError::Unauthorized) => {
                return Err(ApiError::Validation("incorrect email or password".to_string()));
            }
            other => other?,
        };
        log::debug!("received {} token", token.token_type);

        let me: User = self.send(self.get(ME_PATH, &token.access_token)).await?;
        let role = me.role();
        log::info!("logged in as {} ({:?})", me.username, role);
        self.session = Session {
            token: Some(token.access_token),
            authenticated: true,
            role: Some(role),
            email: Some(me.email),
        };
        self.persist()?;
        Ok(&self.session)
    }

    pub async fn register(&mut self, user: &NewUser) -> Result<User, ApiError> {
        validate_email(&user.email)?;
        let request = self.http.post(self.config.url(REGISTER_PATH)).json(user);
        self.send(request).await
    }

    pub async fn me(&mut self) -> Result<User, ApiError> {
        let token = self.authed_token()?;
        self.send(self.get(ME_PATH, &token)).await
    }

    pub async fn update_me(&mut self, update: &UserUpdate) -> Result<User, ApiError> {
        let token = self.authed_token()?;
        let request = self
            .http
            .put(self.config.url(ME_PATH))
            .bearer_auth(&token)
            .json(update);
        self.send(request).await
    }

    pub async fn change_password(
        &mut self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), ApiError> {
        validate_password_change(current, new, confirm)?;
        let token = self.authed_token()?;
        let body = PasswordChange {
            current_password: current,
            new_password: new,
        };
        let request = self
            .http
            .post(self.config.url(CHANGE_PASSWORD_PATH))
            .bearer_auth(&token)
            .json(&body);
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    /// Videos analyzed by the current user.
    pub async fn videos(&mut self) -> Result<Vec<Video>, ApiError> {
        let token = self.authed_token()?;
        self.send(self.get(VIDEOS_PATH, &token)).await
    }

    /// Every user's videos. Admin only.
    pub async fn all_videos(&mut self) -> Result<Vec<Video>, ApiError> {
        let token = self.admin_token()?;
        self.send(self.get(ALL_VIDEOS_PATH, &token)).await
    }

    /// One video with its fire detections.
    pub async fn video(&mut self, video_id: &str) -> Result<Video, ApiError> {
        let token = self.authed_token()?;
        let path = format!("{VIDEOS_PATH}/{video_id}");
        self.send(self.get(&path, &token)).await
    }

    pub async fn my_history(&mut self) -> Result<Vec<HistoryEntry>, ApiError> {
        let token = self.authed_token()?;
        self.send(self.get(MY_HISTORY_PATH, &token)).await
    }

    /// Another user's history. Admin only.
    pub async fn user_history(&mut self, user_id: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        let token = self.admin_token()?;
        let request = self
            .get(&format!("/api/v1/history/{user_id}"), &token)
            .query(&[("skip", 0u32), ("limit", 1000u32)]);
        self.send(request).await
    }

    /// Admin only.
    pub async fn users(&mut self) -> Result<Vec<User>, ApiError> {
        let token = self.admin_token()?;
        self.send(self.get(USERS_PATH, &token)).await
    }

    /// Admin only.
    pub async fn user(&mut self, user_id: &str) -> Result<User, ApiError> {
        let token = self.admin_token()?;
        let path = format!("{USERS_PATH}/{user_id}");
        self.send(self.get(&path, &token)).await
    }

    /// Admin only.
    pub async fn add_user(&mut self, user: &NewUser) -> Result<User, ApiError> {
        let token = self.admin_token()?;
        validate_email(&user.email)?;
        let request = self
            .http
            .post(self.config.url(USERS_PATH))
            .bearer_auth(&token)
            .json(user);
        self.send(request).await
    }

    pub async fn notification_settings(&mut self) -> Result<NotificationSettings, ApiError> {
        let token = self.authed_token()?;
        self.send(self.get(NOTIFICATION_SETTINGS_PATH, &token)).await
    }

    pub async fn set_notification_settings(
        &mut self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings, ApiError> {
        let token = self.authed_token()?;
        let request = self
            .http
            .post(self.config.url(NOTIFICATION_SETTINGS_PATH))
            .bearer_auth(&token)
            .json(settings);
        self.send(request).await
    }
}
