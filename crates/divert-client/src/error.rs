//! Client error types.

use std::fmt;

use divert_core::DivertError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Invalid schedule or query input.
    Schedule(DivertError),
    /// Invalid command-line argument.
    Input(String),
    /// IO error.
    Io(std::io::Error),
    /// Failed to serialize output.
    Output(String),
}

impl ClientError {
    /// Returns true if the error came from user-entered schedule input.
    pub fn is_invalid_schedule(&self) -> bool {
        matches!(self, Self::Schedule(err) if err.is_invalid_schedule())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Schedule(err) if err.is_invalid_schedule() => {
                write!(f, "invalid schedule: {}", err)
            }
            Self::Schedule(err) => write!(f, "{}", err),
            Self::Input(msg) => write!(f, "invalid argument: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schedule(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DivertError> for ClientError {
    fn from(err: DivertError) -> Self {
        Self::Schedule(err)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err.to_string())
    }
}
