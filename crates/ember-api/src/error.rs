use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Request never got a response.
    Network(String),
    /// The backend rejected the token; the session has been cleared.
    Unauthorized,
    /// The current session lacks the role an operation needs.
    Forbidden(String),
    /// Non-success response other than 401.
    Http { status: u16, message: String },
    /// Response body did not match the expected shape.
    Parse(String),
    /// Input rejected before any request was made.
    Validation(String),
    Io(std::io::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Unauthorized => write!(f, "not logged in or session expired"),
            ApiError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            ApiError::Http { status, message } => write!(f, "server returned {status}: {message}"),
            ApiError::Parse(msg) => write!(f, "unexpected response: {msg}"),
            ApiError::Validation(msg) => write!(f, "{msg}"),
            ApiError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
