//! Unverified decoding of access-token claims.
//!
//! DESIGN
//! ======
//! Tokens are `header.payload.signature`, each segment base64url. Only the
//! payload is read; the signature is never checked because the client holds
//! no verification key. Decoded claims are good for picking a landing page
//! and nothing else.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
}

/// Role carried in the `type` claim. Anything unrecognized is `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Agent,
    Default,
}

impl Role {
    /// Map a raw `type` claim to a role, ignoring ASCII case.
    #[must_use]
    pub fn from_claim(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("admin") => Self::Admin,
            Some(value) if value.eq_ignore_ascii_case("agent") => Self::Agent,
            _ => Self::Default,
        }
    }
}

/// Claims read from a token payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Claims {
    /// Raw `type` claim, when present as a string.
    pub kind: Option<String>,
    /// Subject (`sub`), the employee id on the issuing server.
    pub subject: Option<String>,
    /// Expiry (`exp`) in seconds since the Unix epoch.
    pub expires_at: Option<i64>,
    /// Issue time (`iat`) in seconds since the Unix epoch.
    pub issued_at: Option<i64>,
}

impl Claims {
    /// Decode claims from a raw token without verifying its signature.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedToken`] when the token is not three
    /// dot-separated segments or its payload is not a base64url JSON object.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (segments.next(), segments.next(), segments.next(), segments.next())
        else {
            return Err(DecodeError::MalformedToken("expected three segments"));
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| DecodeError::MalformedToken("payload is not base64url"))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|_| DecodeError::MalformedToken("payload is not JSON"))?;
        let Value::Object(map) = value else {
            return Err(DecodeError::MalformedToken("payload is not a JSON object"));
        };

        Ok(Self::from_map(&map))
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let string = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_owned);
        let number = |key: &str| map.get(key).and_then(epoch_secs);
        Self {
            kind: string("type"),
            subject: string("sub"),
            expires_at: number("exp"),
            issued_at: number("iat"),
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_claim(self.kind.as_deref())
    }

    /// True when an `exp` claim exists and is not after `now_secs`.
    #[must_use]
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now_secs)
    }
}

/// Whole seconds from a numeric claim. Fractional values are truncated.
#[allow(clippy::cast_possible_truncation)]
fn epoch_secs(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|secs| secs.trunc() as i64))
}

#[cfg(test)]
#[path = "claims_test.rs"]
mod claims_test;
