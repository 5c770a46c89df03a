//! Persist-then-decode handling of a freshly issued access token.
//!
//! The token is written to storage before decoding is attempted, so an
//! undecodable token is still kept even though routing will not happen.

use crate::claims::{Claims, DecodeError};
use crate::endpoint::RawToken;
use crate::storage::{StorageError, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("token persistence failed: {0}")]
    Storage(#[from] StorageError),
}

pub struct TokenProcessor<S> {
    store: S,
}

impl<S: TokenStore> TokenProcessor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `token`, then decode its claims.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Storage`] if the write fails (nothing is decoded)
    /// and [`ProcessError::Decode`] if the token is structurally invalid.
    pub fn process(&self, token: &RawToken) -> Result<Claims, ProcessError> {
        self.store.save(token.as_str())?;
        let claims = Claims::decode(token.as_str())?;
        Ok(claims)
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;
