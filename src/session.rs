//! Session state derived from the stored token.
//!
//! SYSTEM CONTEXT
//! ==============
//! There is no session object; a decodable, unexpired token under the token
//! key is the session. Restoring never deletes anything: an undecodable token
//! stays where the login flow left it and simply counts as logged out.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::claims::Claims;
use crate::router::Destination;
use crate::storage::{StorageError, TokenStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedIn { claims: Claims, destination: Destination },
    LoggedOut(LoggedOutReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggedOutReason {
    NoToken,
    Undecodable,
    Expired,
}

impl SessionState {
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn { .. })
    }

    /// Derive the session from `store` as of `now_secs` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read.
    pub fn restore_at<S: TokenStore>(store: &S, now_secs: i64) -> Result<Self, StorageError> {
        let Some(token) = store.load()? else {
            return Ok(Self::LoggedOut(LoggedOutReason::NoToken));
        };
        let claims = match Claims::decode(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "stored token is not decodable");
                return Ok(Self::LoggedOut(LoggedOutReason::Undecodable));
            }
        };
        if claims.is_expired_at(now_secs) {
            return Ok(Self::LoggedOut(LoggedOutReason::Expired));
        }
        let destination = Destination::for_role(claims.role());
        Ok(Self::LoggedIn { claims, destination })
    }

    /// [`Self::restore_at`] using the system clock.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read.
    pub fn restore<S: TokenStore>(store: &S) -> Result<Self, StorageError> {
        Self::restore_at(store, now_secs())
    }
}

/// End the session by removing the stored token.
///
/// # Errors
///
/// Returns a [`StorageError`] if the store cannot be updated.
pub fn logout<S: TokenStore>(store: &S) -> Result<(), StorageError> {
    store.clear()?;
    tracing::info!("session token removed");
    Ok(())
}

fn now_secs() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
