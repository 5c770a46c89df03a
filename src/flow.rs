//! One login attempt: submit → persist/decode → route.
//!
//! CONCURRENCY
//! ===========
//! At most one exchange is in flight per flow. A submit while one is pending
//! is ignored (`LoginOutcome::InFlight`). `cancel` abandons the pending attempt
//! by bumping the attempt generation; when its response finally arrives it is
//! discarded without touching storage or navigation. A response is accepted or
//! discarded under the attempt lock, and once accepted it runs to completion.
//! Dropping a pending `submit` future releases the slot the same way.
//!
//! ERROR HANDLING
//! ==============
//! Failures never escape `submit`: they are logged with their error code and
//! folded into one of two `LoginMessage`s. The user retries by submitting again.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::credentials::Credentials;
use crate::endpoint::{AuthEndpoint, RawToken, SubmitError};
use crate::error::{ErrorCode, LoginError, LoginMessage};
use crate::router::{Destination, Navigator, RoleRouter};
use crate::storage::TokenStore;
use crate::token::TokenProcessor;

/// Result of a single `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Token stored and the user was sent to `Destination`.
    Routed(Destination),
    /// The attempt failed; show this message and leave the user on the form.
    Failed(LoginMessage),
    /// Another attempt is already in flight; nothing was sent.
    InFlight,
    /// The attempt was cancelled before its response arrived; the response was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct Attempts {
    generation: u64,
    in_flight: bool,
}

pub struct LoginFlow<E, S, N> {
    endpoint: E,
    processor: TokenProcessor<S>,
    router: RoleRouter<N>,
    attempts: Mutex<Attempts>,
    timeout: Duration,
}

impl<E, S, N> LoginFlow<E, S, N>
where
    E: AuthEndpoint,
    S: TokenStore,
    N: Navigator,
{
    pub fn new(endpoint: E, store: S, navigator: N, timeout: Duration) -> Self {
        Self {
            endpoint,
            processor: TokenProcessor::new(store),
            router: RoleRouter::new(navigator),
            attempts: Mutex::new(Attempts::default()),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn store(&self) -> &S {
        self.processor.store()
    }

    pub fn navigator(&self) -> &N {
        self.router.navigator()
    }

    /// Whether an exchange is currently awaiting its response.
    pub fn is_in_flight(&self) -> bool {
        self.lock_attempts().in_flight
    }

    /// Abandon the pending attempt, if any. Its response will be discarded.
    pub fn cancel(&self) {
        let mut attempts = self.lock_attempts();
        if attempts.in_flight {
            tracing::debug!(generation = attempts.generation, "login attempt cancelled");
        }
        attempts.generation += 1;
        attempts.in_flight = false;
    }

    /// Run one login attempt end to end.
    pub async fn submit(&self, credentials: Credentials) -> LoginOutcome {
        let Some(slot) = self.begin() else {
            tracing::debug!("login already in flight; ignoring submit");
            return LoginOutcome::InFlight;
        };
        tracing::info!(username = credentials.username(), "login attempt started");

        let exchanged = self.exchange_with_timeout(&credentials).await;
        drop(credentials);

        if !slot.accept() {
            tracing::info!(generation = slot.ticket, "discarding response for cancelled login attempt");
            return LoginOutcome::Superseded;
        }
        drop(slot);

        match self.complete(exchanged) {
            Ok(destination) => {
                tracing::info!(%destination, "login succeeded");
                LoginOutcome::Routed(destination)
            }
            Err(err) => {
                tracing::warn!(
                    error_code = err.error_code(),
                    retryable = err.retryable(),
                    error = %err,
                    "login attempt failed"
                );
                LoginOutcome::Failed(err.user_message())
            }
        }
    }

    async fn exchange_with_timeout(&self, credentials: &Credentials) -> Result<RawToken, SubmitError> {
        match tokio::time::timeout(self.timeout, self.endpoint.exchange(credentials)).await {
            Ok(result) => result,
            Err(_) => Err(SubmitError::TransportFailure(format!(
                "no response within {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    fn complete(&self, exchanged: Result<RawToken, SubmitError>) -> Result<Destination, LoginError> {
        let token = exchanged?;
        let claims = self.processor.process(&token)?;
        Ok(self.router.route(&claims))
    }

    /// Claim the in-flight slot. The slot is held until the guard accepts or drops.
    fn begin(&self) -> Option<InFlightSlot<'_>> {
        let mut attempts = self.lock_attempts();
        if attempts.in_flight {
            return None;
        }
        attempts.generation += 1;
        attempts.in_flight = true;
        Some(InFlightSlot { attempts: &self.attempts, ticket: attempts.generation })
    }

    fn lock_attempts(&self) -> MutexGuard<'_, Attempts> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the in-flight slot for one attempt.
struct InFlightSlot<'a> {
    attempts: &'a Mutex<Attempts>,
    ticket: u64,
}

impl InFlightSlot<'_> {
    fn lock(&self) -> MutexGuard<'_, Attempts> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the slot if this attempt is still current. False means it was cancelled.
    fn accept(&self) -> bool {
        let mut attempts = self.lock();
        if attempts.generation != self.ticket {
            return false;
        }
        attempts.in_flight = false;
        true
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let mut attempts = self.lock();
        if attempts.generation == self.ticket {
            attempts.in_flight = false;
        }
    }
}

#[cfg(test)]
#[path = "flow_test.rs"]
mod flow_test;
