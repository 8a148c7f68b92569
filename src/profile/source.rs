use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{self, HeaderMap},
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::profile::{
    credentials::ResolvedCredential,
    error::{
        ProfileError, ProfileErrorKind, cancelled, malformed_response, network_error,
        timeout_error,
    },
    username::Username,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";
const ERROR_BODY_PREVIEW_CHARS: usize = 240;

/// Where raw profile payloads come from. Implementations must return
/// [`ProfileErrorKind::Cancelled`] once `cancel` fires.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(
        &self,
        username: &Username,
        cancel: &CancellationToken,
    ) -> Result<Value, ProfileError>;
}

#[derive(Clone)]
pub struct GithubHttpSource {
    client: Client,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    credential: ResolvedCredential,
}

impl GithubHttpSource {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credential: ResolvedCredential,
    ) -> Result<Self, ProfileError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| network_error(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credential,
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn profile_url(&self, username: &Username) -> String {
        format!("{}/users/{}", self.base_url.trim_end_matches('/'), username)
    }

    async fn request(&self, username: &Username) -> Result<Value, ProfileError> {
        let mut builder = self
            .client
            .get(self.profile_url(username))
            .timeout(self.timeout)
            .header(header::ACCEPT, GITHUB_JSON)
            .header(header::USER_AGENT, self.user_agent.as_str());
        if let Some(auth_header) = &self.credential.auth_header {
            builder = builder.header(header::AUTHORIZATION, auth_header);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &headers, &body));
        }

        response.json::<Value>().await.map_err(|err| {
            if err.is_timeout() {
                timeout_error(format!("profile response timed out: {err}"))
            } else {
                malformed_response(format!("profile response is not valid json: {err}"))
            }
        })
    }
}

#[async_trait]
impl ProfileSource for GithubHttpSource {
    async fn fetch_profile(
        &self,
        username: &Username,
        cancel: &CancellationToken,
    ) -> Result<Value, ProfileError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled()),
            result = self.request(username) => result,
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> ProfileError {
    if err.is_timeout() {
        timeout_error(format!("profile request timed out: {err}"))
    } else {
        network_error(format!("profile request failed: {err}"))
    }
}

pub fn map_http_error(status: StatusCode, headers: &HeaderMap, body: &str) -> ProfileError {
    let code = status.as_u16();
    let upstream_message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| {
            payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .map(|message| message.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>())
        });

    let (kind, fallback) = match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => (
            ProfileErrorKind::RateLimited,
            "GitHub API rate limit exceeded".to_string(),
        ),
        StatusCode::NOT_FOUND => (
            ProfileErrorKind::NotFound,
            "GitHub profile not found".to_string(),
        ),
        _ => (
            ProfileErrorKind::HttpStatus,
            format!("request failed with status {code}"),
        ),
    };

    let message = match upstream_message {
        Some(message) => format!("GitHub API error: {message}"),
        None => fallback,
    };
    let mut err = ProfileError::new(kind, message).with_http_status(code);

    if kind == ProfileErrorKind::RateLimited {
        if let Some(reset) = headers
            .get("x-ratelimit-reset")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            err = err.with_rate_limit_reset(reset);
        }
    }

    err
}
