use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use osdu_mcp_server::auth::{AccessToken, CredentialError, CredentialProvider};
use osdu_mcp_server::client::{HttpTransport, OsduError, OsduRequest, OsduResponse};

/// Records every request and answers from a queue, falling back to a
/// default response once the queue is empty.
pub struct RecordingTransport {
    requests: Mutex<Vec<OsduRequest>>,
    queued: Mutex<VecDeque<OsduResponse>>,
    default: OsduResponse,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::with_default(200, "{}")
    }

    pub fn with_default(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            queued: Mutex::new(VecDeque::new()),
            default: OsduResponse {
                status,
                body: body.to_string(),
            },
        }
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.queued.lock().unwrap().push_back(OsduResponse {
            status,
            body: body.to_string(),
        });
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<OsduRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<OsduRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: OsduRequest) -> Result<OsduResponse, OsduError> {
        self.requests.lock().unwrap().push(request);
        let next = self.queued.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.default.clone()))
    }
}

/// Credential provider that counts fetches and the scopes it was asked for.
/// Clones share their counters, so a test can keep one and hand the other to
/// an `AuthHandler`.
#[derive(Clone)]
pub struct CountingCredential {
    state: Arc<CredentialState>,
    delay: StdDuration,
}

struct CredentialState {
    fetches: AtomicUsize,
    closes: AtomicUsize,
    scopes: Mutex<Vec<String>>,
    tokens: Mutex<VecDeque<AccessToken>>,
}

impl CountingCredential {
    /// Always hands out `token`, valid for an hour.
    pub fn new(token: &str) -> Self {
        let credential = Self::empty();
        credential.push_token(token, Duration::hours(1));
        credential
    }

    pub fn empty() -> Self {
        Self {
            state: Arc::new(CredentialState {
                fetches: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                scopes: Mutex::new(Vec::new()),
                tokens: Mutex::new(VecDeque::new()),
            }),
            delay: StdDuration::ZERO,
        }
    }

    /// Each fetch sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: StdDuration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a token that expires `valid_for` from now. The last queued
    /// token is repeated once the others are used up.
    pub fn push_token(&self, token: &str, valid_for: Duration) {
        self.state
            .tokens
            .lock()
            .unwrap()
            .push_back(AccessToken::new(token, Utc::now() + valid_for));
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn scopes(&self) -> Vec<String> {
        self.state.scopes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialProvider for CountingCredential {
    fn name(&self) -> &str {
        "counting"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        self.state.scopes.lock().unwrap().push(scope.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut tokens = self.state.tokens.lock().unwrap();
        let token = if tokens.len() > 1 {
            tokens.pop_front()
        } else {
            tokens.front().cloned()
        };
        token.ok_or_else(|| CredentialError::Authentication("no token queued".to_string()))
    }

    fn close(&self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
