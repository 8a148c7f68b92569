use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::profile::error::ProfileError;

pub const STALE_CACHE_NOTICE: &str = "Using cached data, live data unavailable";
pub const GENERIC_FAILURE_MESSAGE: &str = "Unable to load GitHub profile";

/// The only profile fields that are ever stored or displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubProfile {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl GithubProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedProfileEntry {
    pub data: GithubProfile,
    /// Epoch milliseconds of the fetch that produced `data`.
    pub timestamp: i64,
}

impl CachedProfileEntry {
    pub fn new(data: GithubProfile, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp)
    }

    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_ms(now_ms) < ttl_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileOrigin {
    Cache,
    Network,
    StaleCache,
}

/// Result of one completed load: where the data came from and, for a stale
/// fallback, the failure that forced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub data: GithubProfile,
    pub origin: ProfileOrigin,
    pub fallback_reason: Option<ProfileError>,
}

impl LoadOutcome {
    pub fn is_degraded(&self) -> bool {
        self.origin == ProfileOrigin::StaleCache
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// What the presentation layer renders for one profile controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub status: FetchStatus,
    pub data: Option<GithubProfile>,
    pub error_message: Option<String>,
    /// `data` came from an expired cache entry after the live fetch failed.
    pub stale: bool,
    pub retry_count: u32,
}

impl ProfileView {
    pub fn idle() -> Self {
        Self {
            status: FetchStatus::Idle,
            data: None,
            error_message: None,
            stale: false,
            retry_count: 0,
        }
    }

    pub fn loading(retry_count: u32) -> Self {
        Self {
            status: FetchStatus::Loading,
            retry_count,
            ..Self::idle()
        }
    }

    pub fn from_outcome(outcome: LoadOutcome, retry_count: u32) -> Self {
        let stale = outcome.is_degraded();
        Self {
            status: FetchStatus::Success,
            data: Some(outcome.data),
            error_message: stale.then(|| STALE_CACHE_NOTICE.to_string()),
            stale,
            retry_count,
        }
    }

    pub fn from_error(err: &ProfileError, retry_count: u32) -> Self {
        let message = if err.message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            err.message.clone()
        };
        Self {
            status: FetchStatus::Error,
            error_message: Some(message),
            retry_count,
            ..Self::idle()
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.status, FetchStatus::Success | FetchStatus::Error)
    }
}
