//! Login failure taxonomy and the two messages users ever see.

use std::fmt;

use crate::claims::DecodeError;
use crate::endpoint::SubmitError;
use crate::storage::StorageError;
use crate::token::ProcessError;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured log fields.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// LOGIN ERROR
// =============================================================================

/// Everything that can end a login attempt before routing.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The server refused the credentials (any non-success status).
    #[error("credentials rejected: status {status}")]
    AuthRejected { status: u16, detail: Option<String> },

    /// Network, timeout, or unexpected response shape.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// A token arrived but its claims could not be read.
    #[error(transparent)]
    MalformedToken(#[from] DecodeError),

    /// The token could not be written to storage.
    #[error("token storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl From<SubmitError> for LoginError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::AuthRejected { status, detail } => Self::AuthRejected { status, detail },
            SubmitError::TransportFailure(msg) => Self::TransportFailure(msg),
        }
    }
}

impl From<ProcessError> for LoginError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Decode(e) => Self::MalformedToken(e),
            ProcessError::Storage(e) => Self::Storage(e),
        }
    }
}

impl LoginError {
    /// The message shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> LoginMessage {
        match self {
            Self::AuthRejected { .. } => LoginMessage::CredentialsRejected,
            Self::TransportFailure(_) | Self::MalformedToken(_) | Self::Storage(_) => LoginMessage::TryAgain,
        }
    }
}

impl ErrorCode for LoginError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AuthRejected { .. } => "E_AUTH_REJECTED",
            Self::TransportFailure(_) => "E_TRANSPORT",
            Self::MalformedToken(_) => "E_MALFORMED_TOKEN",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::TransportFailure(_) | Self::Storage(_))
    }
}

// =============================================================================
// USER MESSAGE
// =============================================================================

/// User-facing outcome text. Carries no server detail, token, or trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMessage {
    CredentialsRejected,
    TryAgain,
}

impl LoginMessage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CredentialsRejected => "Login failed. Please check your credentials.",
            Self::TryAgain => "Login failed. Please try again.",
        }
    }
}

impl fmt::Display for LoginMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
