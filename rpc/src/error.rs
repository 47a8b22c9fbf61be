use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Domain error kinds that may cross the transport.
///
/// Each kind has a fixed status code so both ends agree on its meaning without inspecting
/// the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ValidationError,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::ValidationError => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error sent back in place of a result.
///
/// Never carries internal detail: `Internal` errors use the generic message, or the fixed
/// "Response too large" when a result exceeds the frame limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct RemoteError {
    pub status_code: u16,
    pub message: String,
    pub error_kind: ErrorKind,
}

impl RemoteError {
    pub const INTERNAL_MESSAGE: &'static str = "Internal server error";

    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status_code: kind.status_code(),
            message: message.into(),
            error_kind: kind,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, Self::INTERNAL_MESSAGE)
    }
}

/// Failure of a client call.
///
/// `Remote` is a domain error reported by the server. Every other variant is a transport
/// failure and says nothing about the request itself.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("{0}")]
    Remote(RemoteError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl RpcError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Timeout(_) | RpcError::ServiceUnavailable(_))
    }
}
