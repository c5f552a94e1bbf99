use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }

    pub fn is_auth(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

/// A non-success answer from the catalog service.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code:?} (HTTP {status}): {message}")]
pub struct ServiceRejection {
    pub code: ErrorCode,
    pub status: u16,
    pub message: String,
}

impl ServiceRejection {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::from_status(status),
            status,
            message: message.into(),
        }
    }
}
