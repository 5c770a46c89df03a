//! Client-side login flow: exchange credentials for an access token, read the
//! caller's role from the token, persist it, and route to a landing page.
//!
//! PIPELINE
//! ========
//! `endpoint` (submit) → `token` (persist + decode) → `router` (dispatch).
//! `flow::LoginFlow` drives one attempt at a time and converts every failure
//! into one of two user-facing messages from `error`.
//!
//! TRUST BOUNDARY
//! ==============
//! Claims are decoded without signature verification. They select a landing
//! page only; the server remains the authority on what a session may do.

pub mod claims;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod flow;
pub mod router;
pub mod session;
pub mod storage;
pub mod token;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use claims::{Claims, DecodeError, Role};
pub use config::AuthConfig;
pub use credentials::Credentials;
pub use endpoint::{AuthEndpoint, CurrentUser, HttpAuthEndpoint, RawToken, SubmitError};
pub use error::{ErrorCode, LoginError, LoginMessage};
pub use flow::{LoginFlow, LoginOutcome};
pub use router::{Destination, Navigator, RoleRouter};
pub use session::{LoggedOutReason, SessionState, logout};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
pub use token::{ProcessError, TokenProcessor};
