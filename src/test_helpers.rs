//! Shared fixtures for unit tests: fake tokens, recording collaborators,
//! and an in-process stub of the auth server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::credentials::Credentials;
use crate::endpoint::{AuthEndpoint, RawToken, SubmitError};
use crate::router::Navigator;

/// Build an unsigned-looking token whose payload is `claims`.
pub fn fake_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn role_token(kind: &str) -> String {
    fake_token(&json!({ "sub": "E001", "type": kind, "exp": 4_102_444_800_i64 }))
}

// =============================================================================
// RECORDING NAVIGATOR
// =============================================================================

#[derive(Clone, Default)]
pub struct RecordingNavigator {
    visits: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_owned());
    }
}

// =============================================================================
// MOCK ENDPOINT
// =============================================================================

/// Endpoint returning queued results, optionally parked until released.
pub struct MockEndpoint {
    results: Mutex<Vec<Result<RawToken, SubmitError>>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    delay: Option<Duration>,
}

impl MockEndpoint {
    pub fn new(results: Vec<Result<RawToken, SubmitError>>) -> Self {
        Self { results: Mutex::new(results), calls: AtomicUsize::new(0), gate: None, delay: None }
    }

    /// Park every exchange until `gate` is notified.
    pub fn gated(results: Vec<Result<RawToken, SubmitError>>, gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::new(results) }
    }

    pub fn slow(results: Vec<Result<RawToken, SubmitError>>, delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::new(results) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthEndpoint for MockEndpoint {
    async fn exchange(&self, _credentials: &Credentials) -> Result<RawToken, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = {
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                Err(SubmitError::TransportFailure("no queued response".into()))
            } else {
                results.remove(0)
            }
        };
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

// =============================================================================
// STUB AUTH SERVER
// =============================================================================

/// Stub of the auth server: `bob`/`correct` gets an agent token, `root`/`correct`
/// an admin token, `garbled`/`correct` a 200 without `access_token`, anyone
/// else a 401.
#[derive(Clone, Default)]
pub struct StubServer {
    pub token_requests: Arc<AtomicUsize>,
    pub last_form: Arc<Mutex<Option<HashMap<String, String>>>>,
    pub last_content_type: Arc<Mutex<Option<String>>>,
}

impl StubServer {
    /// Bind to an ephemeral port and return the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/auth/token", post(issue_token))
            .route("/auth/users/me", get(current_user))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }
}

async fn issue_token(
    State(stub): State<StubServer>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    stub.token_requests.fetch_add(1, Ordering::SeqCst);
    *stub.last_content_type.lock().unwrap() = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *stub.last_form.lock().unwrap() = Some(form.clone());

    let username = form.get("username").map(String::as_str);
    let password = form.get("password").map(String::as_str);
    match (username, password) {
        (Some("bob"), Some("correct")) => {
            (StatusCode::OK, Json(json!({ "access_token": role_token("Agent"), "token_type": "bearer" })))
        }
        (Some("root"), Some("correct")) => {
            (StatusCode::OK, Json(json!({ "access_token": role_token("Admin"), "token_type": "bearer" })))
        }
        (Some("garbled"), Some("correct")) => (StatusCode::OK, Json(json!({ "token_type": "bearer" }))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Incorrect username or password" }))),
    }
}

async fn current_user(headers: HeaderMap) -> impl IntoResponse {
    let expected = format!("Bearer {}", role_token("Agent"));
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Could not validate credentials" })));
    }
    (StatusCode::OK, Json(json!({ "username": "bob", "password": "********", "type": "Agent", "employee_id": "E001" })))
}
