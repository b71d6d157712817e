//! Test helpers for integration tests.
//!
//! Provides a mock Mailcow API server on an ephemeral port and helpers to
//! wire the provisioning service against an in-memory database.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use mailcow_provision::config::{Config, MailcowConfig};
use mailcow_provision::web::{build_state, AppState};
use mailcow_provision::{Database, IntegrationSettings};

/// Admin bearer token configured by `test_config`.
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token-0123456789";

/// Domain used by all provisioning tests.
pub const TEST_DOMAIN: &str = "corp.test";

/// Canned reply of the mock server.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub body: String,
}

impl MockReply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// Mailcow's native success reply.
    pub fn mailbox_added() -> Self {
        Self::json(
            StatusCode::OK,
            json!([{"type": "success", "log": ["mailbox", "add"], "msg": ["mailbox_added", "x"]}]),
        )
    }
}

/// A request captured by the mock server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: String,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("captured body is JSON")
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

struct MockState {
    add_calls: AtomicUsize,
    list_calls: AtomicUsize,
    version_calls: AtomicUsize,
    add_reply: Mutex<MockReply>,
    list_reply: Mutex<MockReply>,
    delay: Mutex<Duration>,
    requests: Mutex<Vec<CapturedRequest>>,
}

/// Mock Mailcow API.
#[derive(Clone)]
pub struct MockMailcow {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockMailcow {
    /// Start the mock on 127.0.0.1 with an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            add_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            version_calls: AtomicUsize::new(0),
            add_reply: Mutex::new(MockReply::mailbox_added()),
            list_reply: Mutex::new(MockReply::json(StatusCode::OK, json!([]))),
            delay: Mutex::new(Duration::ZERO),
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/api/v1/add/mailbox", post(add_mailbox))
            .route("/api/v1/get/mailbox/all", get(list_mailboxes))
            .route("/api/v1/get/status/version", get(version))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL of the mock, without trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_add_reply(&self, reply: MockReply) {
        *self.state.add_reply.lock().unwrap() = reply;
    }

    pub fn set_list_reply(&self, reply: MockReply) {
        *self.state.list_reply.lock().unwrap() = reply;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn add_calls(&self) -> usize {
        self.state.add_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn version_calls(&self) -> usize {
        self.state.version_calls.load(Ordering::SeqCst)
    }

    /// All captured requests, oldest first.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CapturedRequest {
        self.requests().pop().expect("no request captured")
    }
}

fn capture(state: &MockState, headers: HeaderMap, body: String) {
    state
        .requests
        .lock()
        .unwrap()
        .push(CapturedRequest { headers, body });
}

fn reply(reply: MockReply) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    (
        reply.status,
        [("content-type", "application/json")],
        reply.body,
    )
}

async fn add_mailbox(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    state.add_calls.fetch_add(1, Ordering::SeqCst);
    capture(&state, headers, body);

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let canned = state.add_reply.lock().unwrap().clone();
    reply(canned)
}

async fn list_mailboxes(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    capture(&state, headers, String::new());
    let canned = state.list_reply.lock().unwrap().clone();
    reply(canned)
}

async fn version(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    state.version_calls.fetch_add(1, Ordering::SeqCst);
    capture(&state, headers, String::new());
    reply(MockReply::json(StatusCode::OK, json!({"version": "2024-11b"})))
}

/// Service configuration with a short Mailcow timeout.
pub fn test_config() -> Config {
    let mut config = Config {
        mailcow: MailcowConfig {
            timeout_secs: 1,
            ..MailcowConfig::default()
        },
        ..Config::default()
    };
    config.server.admin_token = Some(TEST_ADMIN_TOKEN.to_string());
    config
}

/// Enabled settings pointing at `url`.
pub fn enabled_settings(url: &str, auto_create_email_account: bool) -> IntegrationSettings {
    IntegrationSettings {
        enabled: true,
        api_base_url: url.to_string(),
        api_key: "test-api-key".to_string(),
        mail_domain: TEST_DOMAIN.to_string(),
        default_quota_mb: 2048,
        auto_create_email_account,
    }
}

/// Application state over a fresh in-memory database.
pub async fn create_state(config: &Config) -> (AppState, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    (build_state(config, db.clone()), db)
}
