use ember_com::ComError;
use ember_proto::ProtoError;
use std::fmt;

#[derive(Debug)]
pub enum ViewerError {
    Com(ComError),
    Proto(ProtoError),
    Io(std::io::Error),
    /// The job was rejected before anything was sent.
    InvalidJob(String),
    /// The backend answered with an `error` status.
    Server(String),
    Sink(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::Com(err) => write!(f, "channel error: {err}"),
            ViewerError::Proto(err) => write!(f, "protocol error: {err}"),
            ViewerError::Io(err) => write!(f, "io error: {err}"),
            ViewerError::InvalidJob(msg) => write!(f, "invalid job: {msg}"),
            ViewerError::Server(msg) => write!(f, "server error: {msg}"),
            ViewerError::Sink(msg) => write!(f, "frame sink error: {msg}"),
        }
    }
}

impl std::error::Error for ViewerError {}

impl From<ComError> for ViewerError {
    fn from(err: ComError) -> Self {
        ViewerError::Com(err)
    }
}

impl From<ProtoError> for ViewerError {
    fn from(err: ProtoError) -> Self {
        ViewerError::Proto(err)
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        ViewerError::Io(err)
    }
}
