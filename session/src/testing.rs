//! Test doubles for the session seams.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::api::{AuthService, HttpRequest, HttpResponse, HttpTransport};
use crate::clock::{TimeSource, TimerDriver};
use crate::error::{ApiError, AuthError};
use crate::guard::Navigator;
use crate::types::{LoginInput, LoginResponse, Session, TokenGrant, User};

pub const T0: OffsetDateTime = datetime!(2026-01-01 00:00 UTC);

pub fn sample_user() -> User {
    User {
        id: "u-1".to_owned(),
        email: "a@b.com".to_owned(),
        full_name: "Ayu Lestari".to_owned(),
        username: None,
    }
}

pub fn grant(n: u32, expires_at: OffsetDateTime, refresh_expires_at: OffsetDateTime) -> TokenGrant {
    TokenGrant {
        token: format!("access-{n}"),
        refresh_token: format!("refresh-{n}"),
        expires_at,
        refresh_expires_at,
    }
}

pub fn sample_session() -> Session {
    Session::new(sample_user(), grant(1, datetime!(2026-01-01 01:00 UTC), datetime!(2026-01-08 00:00 UTC)))
}

pub fn login_response(n: u32, access_ttl: Duration) -> LoginResponse {
    LoginResponse { grant: grant(n, T0 + access_ttl, T0 + Duration::days(7)), user: sample_user() }
}

// =============================================================
// Time
// =============================================================

/// Manually advanced wall clock.
pub struct FixedTime(Cell<OffsetDateTime>);

impl FixedTime {
    pub fn at(now: OffsetDateTime) -> Rc<Self> {
        Rc::new(Self(Cell::new(now)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> OffsetDateTime {
        self.0.get()
    }
}

/// Timer driver that records scheduled fires; tests run them explicitly.
#[derive(Default)]
pub struct ManualTimer {
    scheduled: RefCell<Vec<(std::time::Duration, LocalBoxFuture<'static, ()>)>>,
    delays: RefCell<Vec<std::time::Duration>>,
}

impl ManualTimer {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Every delay ever scheduled, in order.
    pub fn delays(&self) -> Vec<std::time::Duration> {
        self.delays.borrow().clone()
    }

    pub fn last_delay(&self) -> Option<std::time::Duration> {
        self.delays.borrow().last().copied()
    }

    /// Take the most recently scheduled fire, dropping older ones.
    pub fn take_latest(&self) -> Option<LocalBoxFuture<'static, ()>> {
        let mut scheduled = self.scheduled.borrow_mut();
        let latest = scheduled.pop().map(|(_, task)| task);
        scheduled.clear();
        latest
    }

    /// Take every scheduled fire, oldest first.
    pub fn take_all(&self) -> Vec<LocalBoxFuture<'static, ()>> {
        self.scheduled.borrow_mut().drain(..).map(|(_, task)| task).collect()
    }
}

impl TimerDriver for ManualTimer {
    fn spawn_after(&self, delay: std::time::Duration, task: LocalBoxFuture<'static, ()>) {
        self.delays.borrow_mut().push(delay);
        self.scheduled.borrow_mut().push((delay, task));
    }
}

// =============================================================
// Auth service
// =============================================================

pub enum Scripted<T> {
    Ready(Result<T, AuthError>),
    /// Resolves when the test sends on the paired channel.
    Gated(oneshot::Receiver<Result<T, AuthError>>),
}

/// Auth service replaying queued outcomes.
#[derive(Default)]
pub struct ScriptedAuthService {
    logins: RefCell<VecDeque<Scripted<LoginResponse>>>,
    refreshes: RefCell<VecDeque<Scripted<TokenGrant>>>,
    pub login_calls: Cell<usize>,
    pub refresh_calls: Cell<usize>,
    pub refresh_tokens_seen: RefCell<Vec<String>>,
}

impl ScriptedAuthService {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn push_login(&self, outcome: Result<LoginResponse, AuthError>) {
        self.logins.borrow_mut().push_back(Scripted::Ready(outcome));
    }

    pub fn gate_login(&self) -> oneshot::Sender<Result<LoginResponse, AuthError>> {
        let (tx, rx) = oneshot::channel();
        self.logins.borrow_mut().push_back(Scripted::Gated(rx));
        tx
    }

    pub fn push_refresh(&self, outcome: Result<TokenGrant, AuthError>) {
        self.refreshes.borrow_mut().push_back(Scripted::Ready(outcome));
    }

    pub fn gate_refresh(&self) -> oneshot::Sender<Result<TokenGrant, AuthError>> {
        let (tx, rx) = oneshot::channel();
        self.refreshes.borrow_mut().push_back(Scripted::Gated(rx));
        tx
    }
}

async fn resolve<T>(next: Option<Scripted<T>>) -> Result<T, AuthError> {
    match next {
        Some(Scripted::Ready(outcome)) => outcome,
        Some(Scripted::Gated(rx)) => rx.await.unwrap_or(Err(AuthError::Network("gate dropped".to_owned()))),
        None => Err(AuthError::Network("no scripted response".to_owned())),
    }
}

#[async_trait(?Send)]
impl AuthService for ScriptedAuthService {
    async fn login(&self, _input: &LoginInput) -> Result<LoginResponse, AuthError> {
        self.login_calls.set(self.login_calls.get() + 1);
        let next = self.logins.borrow_mut().pop_front();
        resolve(next).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        self.refresh_calls.set(self.refresh_calls.get() + 1);
        self.refresh_tokens_seen.borrow_mut().push(refresh_token.to_owned());
        let next = self.refreshes.borrow_mut().pop_front();
        resolve(next).await
    }
}

// =============================================================
// HTTP transport
// =============================================================

/// Transport replaying queued responses and recording requests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn push(&self, status: u16, body: serde_json::Value) {
        self.responses.borrow_mut().push_back(Ok(HttpResponse { status, body: body.to_string() }));
    }

    pub fn push_raw(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(HttpResponse { status, body: body.to_owned() }));
    }

    pub fn push_failure(&self, message: &str) {
        self.responses.borrow_mut().push_back(Err(ApiError::transport(message)));
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("no scripted response")))
    }
}

// =============================================================
// Navigation
// =============================================================

#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: RefCell<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.borrow_mut().push(path.to_owned());
    }
}
