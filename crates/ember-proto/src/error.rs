use std::fmt;

#[derive(Debug)]
pub enum ProtoError {
    Json(serde_json::Error),
    Base64(base64::DecodeError),
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtoError::Json(err) => write!(f, "malformed json: {err}"),
            ProtoError::Base64(err) => write!(f, "malformed base64 image: {err}"),
        }
    }
}

impl std::error::Error for ProtoError {}

impl From<serde_json::Error> for ProtoError {
    fn from(err: serde_json::Error) -> Self {
        ProtoError::Json(err)
    }
}

impl From<base64::DecodeError> for ProtoError {
    fn from(err: base64::DecodeError) -> Self {
        ProtoError::Base64(err)
    }
}
