//! Credential exchange against the remote auth server.
//!
//! ERROR HANDLING
//! ==============
//! Any non-success status is a rejection; the server's `detail` text is kept
//! for logs only. Everything else that goes wrong on the wire (connect,
//! timeout, unreadable body, missing `access_token`) is a transport failure.
//! Neither is retried here.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::credentials::Credentials;

pub const TOKEN_PATH: &str = "/auth/token";
pub const CURRENT_USER_PATH: &str = "/auth/users/me";

/// Access token exactly as returned by the auth server.
#[derive(Clone, PartialEq, Eq)]
pub struct RawToken(String);

impl RawToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawToken(<{} bytes>)", self.0.len())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("auth server rejected credentials: status {status}")]
    AuthRejected { status: u16, detail: Option<String> },
    #[error("auth exchange failed: {0}")]
    TransportFailure(String),
}

/// Exchanges credentials for an access token.
#[async_trait::async_trait]
pub trait AuthEndpoint: Send + Sync {
    /// Issue exactly one exchange request.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::AuthRejected`] for a non-success status and
    /// [`SubmitError::TransportFailure`] for network or body problems.
    async fn exchange(&self, credentials: &Credentials) -> Result<RawToken, SubmitError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: Option<String>,
}

/// Profile returned by `GET /auth/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub employee_id: Option<String>,
}

/// `reqwest`-backed endpoint for `POST {base}/auth/token`.
#[derive(Debug, Clone)]
pub struct HttpAuthEndpoint {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthEndpoint {
    /// Build a client bounded by the configured request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::TransportFailure`] if the HTTP client cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self, SubmitError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| SubmitError::TransportFailure(format!("http client build failed: {e}")))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch the profile of the token's owner from `/auth/users/me`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`AuthEndpoint::exchange`]: a non-success status is a
    /// rejection (the token is no longer accepted), anything else is transport.
    pub async fn current_user(&self, token: &RawToken) -> Result<CurrentUser, SubmitError> {
        let resp = self
            .http
            .get(self.url(CURRENT_USER_PATH))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| SubmitError::TransportFailure(e.to_string()))?;
        let resp = reject_unless_success(resp).await?;
        resp.json::<CurrentUser>()
            .await
            .map_err(|e| SubmitError::TransportFailure(format!("malformed user response: {e}")))
    }
}

#[async_trait::async_trait]
impl AuthEndpoint for HttpAuthEndpoint {
    async fn exchange(&self, credentials: &Credentials) -> Result<RawToken, SubmitError> {
        let resp = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&credentials.form_fields())
            .send()
            .await
            .map_err(|e| SubmitError::TransportFailure(e.to_string()))?;
        let resp = reject_unless_success(resp).await?;

        let body = resp
            .text()
            .await
            .map_err(|e| SubmitError::TransportFailure(e.to_string()))?;
        parse_token_response(&body)
    }
}

async fn reject_unless_success(resp: reqwest::Response) -> Result<reqwest::Response, SubmitError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SubmitError::AuthRejected { status: status.as_u16(), detail: parse_error_detail(&body) })
}

fn parse_token_response(body: &str) -> Result<RawToken, SubmitError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| SubmitError::TransportFailure(format!("malformed token response: {e}")))?;
    Ok(RawToken(parsed.access_token))
}

fn parse_error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body).ok()?.detail
}

#[cfg(test)]
#[path = "endpoint_test.rs"]
mod endpoint_test;
