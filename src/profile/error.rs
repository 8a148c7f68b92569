use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileErrorKind {
    Validation,
    Network,
    Timeout,
    RateLimited,
    NotFound,
    HttpStatus,
    MalformedResponse,
    Cancelled,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileError {
    pub kind: ProfileErrorKind,
    pub message: String,
    pub http_status: Option<u16>,
    /// Epoch seconds at which the upstream rate limit resets, when reported.
    pub rate_limit_reset: Option<u64>,
}

impl ProfileError {
    pub fn new(kind: ProfileErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
            rate_limit_reset: None,
        }
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_rate_limit_reset(mut self, reset: u64) -> Self {
        self.rate_limit_reset = Some(reset);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ProfileErrorKind::Cancelled
    }

    /// Failures of the live fetch that fall back to the cache and make a retry meaningful.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            ProfileErrorKind::Network
                | ProfileErrorKind::Timeout
                | ProfileErrorKind::RateLimited
                | ProfileErrorKind::NotFound
                | ProfileErrorKind::HttpStatus
                | ProfileErrorKind::MalformedResponse
        )
    }
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(status) => write!(f, "{} (status={})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProfileError {}

pub fn validation_error(message: impl Into<String>) -> ProfileError {
    ProfileError::new(ProfileErrorKind::Validation, message)
}

pub fn network_error(message: impl Into<String>) -> ProfileError {
    ProfileError::new(ProfileErrorKind::Network, message)
}

pub fn timeout_error(message: impl Into<String>) -> ProfileError {
    ProfileError::new(ProfileErrorKind::Timeout, message)
}

pub fn malformed_response(message: impl Into<String>) -> ProfileError {
    ProfileError::new(ProfileErrorKind::MalformedResponse, message)
}

pub fn cancelled() -> ProfileError {
    ProfileError::new(ProfileErrorKind::Cancelled, "profile request was cancelled")
}
