//! Auth session state machine.
//!
//! ARCHITECTURE
//! ============
//! [`AuthSessionManager`] is a cheap-clone handle over `Rc<Inner>`, created
//! once by the application root and shared through context. It owns the
//! [`SessionClock`] directly: the renewal-success path simply calls `arm`
//! again, and the fire future holds only a `Weak` reference back to the
//! manager so a pending timer never keeps a torn-down manager alive.
//!
//! ```text
//!  Unknown ──bootstrap──▶ Authenticated ◀──────┐
//!     │                       │  ▲   clock fire │
//!     └──▶ Unauthenticated    ▼  │ ok           │
//!            │   ▲  ▲      Renewing ───fail──▶ (logout)
//!      login │   │  └──────────────────────────┘
//!            ▼   │ fail
//!        Authenticating ──ok──▶ Authenticated
//! ```
//!
//! CONCURRENCY
//! ===========
//! Single-threaded; suspension happens only while awaiting the auth service.
//! Every operation that ends or replaces a session bumps `epoch`. A request
//! that resumes to find a different epoch discards its result, which is how a
//! logout during an in-flight login or renewal wins. The clock is always
//! disarmed before the store is cleared, and armed only after the store has
//! been written.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use time::OffsetDateTime;

use crate::api::AuthService;
use crate::clock::{ArmOutcome, SessionClock, TimeSource, TimerDriver};
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::store::TokenStore;
use crate::types::{LoginInput, Session, TokenGrant, User};

/// Internal state-machine phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    /// Bootstrap has not run yet.
    Unknown,
    Unauthenticated,
    /// A login request is outstanding.
    Authenticating,
    Authenticated,
    /// Authenticated with a background renewal in flight.
    Renewing,
}

impl AuthPhase {
    /// What consumers observe for this phase.
    #[must_use]
    pub fn status(self) -> AuthStatus {
        match self {
            Self::Unknown => AuthStatus::Loading,
            Self::Unauthenticated | Self::Authenticating => AuthStatus::Unauthenticated,
            Self::Authenticated | Self::Renewing => AuthStatus::Authenticated,
        }
    }
}

/// Consumer-visible authentication status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    /// Bootstrap has not resolved; guards must wait.
    Loading,
    Unauthenticated,
    Authenticated,
}

/// Point-in-time view handed to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub status: AuthStatus,
    pub user: Option<User>,
}

impl AuthSnapshot {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::Loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

/// What a renewal attempt did.
#[derive(Clone, Debug, PartialEq)]
pub enum RenewOutcome {
    /// Tokens replaced and the clock re-armed.
    Renewed,
    /// Nothing to renew: no session, a renewal already in flight, or the
    /// timer belonged to a session that has since ended.
    Skipped,
    /// Renewal failed and the session was ended.
    Terminated(AuthError),
}

/// Identifier returned by [`AuthSessionManager::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&AuthSnapshot)>;

struct State {
    phase: AuthPhase,
    session: Option<Session>,
    epoch: u64,
}

struct Inner {
    service: Rc<dyn AuthService>,
    store: Rc<dyn TokenStore>,
    clock: SessionClock,
    state: RefCell<State>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
}

/// Handle to the application's single session manager.
#[derive(Clone)]
pub struct AuthSessionManager {
    inner: Rc<Inner>,
}

impl AuthSessionManager {
    #[must_use]
    pub fn new(
        service: Rc<dyn AuthService>,
        store: Rc<dyn TokenStore>,
        driver: Rc<dyn TimerDriver>,
        time: Rc<dyn TimeSource>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                service,
                store,
                clock: SessionClock::new(driver, time, config.renewal_lead),
                state: RefCell::new(State { phase: AuthPhase::Unknown, session: None, epoch: 0 }),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.inner.state.borrow().phase
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.phase().status()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    /// Whether bootstrap has resolved (the status is no longer `Loading`).
    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.phase() != AuthPhase::Unknown
    }

    /// Signed-in user; `None` unless authenticated.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        let state = self.inner.state.borrow();
        if state.phase.status() == AuthStatus::Authenticated {
            state.session.as_ref().map(|s| s.user.clone())
        } else {
            None
        }
    }

    /// Current access token; `None` unless authenticated.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        let state = self.inner.state.borrow();
        if state.phase.status() == AuthStatus::Authenticated {
            state.session.as_ref().map(|s| s.access_token.clone())
        } else {
            None
        }
    }

    /// Status and user as one consistent view.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot { status: self.status(), user: self.user() }
    }

    /// Whether a renewal timer is pending.
    #[must_use]
    pub fn renewal_armed(&self) -> bool {
        self.inner.clock.is_armed()
    }

    /// Register a change listener. Listeners run after the state settles and
    /// may call back into the manager.
    pub fn subscribe(&self, listener: impl Fn(&AuthSnapshot) + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<Listener> = self.inner.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn set_phase(&self, phase: AuthPhase) {
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            std::mem::replace(&mut state.phase, phase)
        };
        if previous != phase {
            log::debug!("session: {previous:?} -> {phase:?}");
        }
        if previous.status() != phase.status() {
            self.notify();
        }
    }

    fn epoch(&self) -> u64 {
        self.inner.state.borrow().epoch
    }

    fn bump_epoch(&self) -> u64 {
        let mut state = self.inner.state.borrow_mut();
        state.epoch += 1;
        state.epoch
    }

    fn now(&self) -> OffsetDateTime {
        self.inner.clock.now()
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Resolve the initial status from the token store. Runs once; later calls
    /// return the current status.
    pub fn bootstrap(&self) -> AuthStatus {
        if self.is_bootstrapped() {
            return self.status();
        }

        let stored = match self.inner.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("session: stored session unreadable, starting signed out: {err}");
                None
            }
        };
        let now = self.now();

        match stored {
            Some(session) if session.access_valid_at(now) && session.refresh_valid_at(now) => {
                let access_expires_at = session.access_expires_at;
                self.inner.state.borrow_mut().session = Some(session);
                let epoch = self.bump_epoch();
                if let Err(err) = self.enter_authenticated(access_expires_at, epoch) {
                    log::debug!("session: restored session not kept: {err}");
                }
            }
            Some(session) => {
                log::debug!(
                    "session: stored session expired (refresh valid: {}), clearing",
                    session.refresh_valid_at(now)
                );
                self.clear_store();
                self.set_phase(AuthPhase::Unauthenticated);
            }
            None => {
                self.clear_store();
                self.set_phase(AuthPhase::Unauthenticated);
            }
        }
        self.status()
    }

    // =========================================================================
    // LOGIN
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Busy`] if a login is already outstanding.
    /// - [`AuthError::SessionActive`] if a session is active.
    /// - The service's error ([`AuthError::Authentication`], [`AuthError::Network`], ...).
    /// - [`AuthError::Storage`] if the session cannot be persisted.
    /// - [`AuthError::Expired`] if the issued access token is already expired.
    /// - [`AuthError::Cancelled`] if a logout happened while the request was
    ///   outstanding, or a listener ended the session as it was established.
    ///
    /// Runs [`Self::bootstrap`] first if it has not run yet, so a restored
    /// session yields [`AuthError::SessionActive`].
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A persisted session must be read before a login can replace it.
        self.bootstrap();
        match self.phase() {
            AuthPhase::Authenticating => return Err(AuthError::Busy),
            AuthPhase::Authenticated | AuthPhase::Renewing => return Err(AuthError::SessionActive),
            AuthPhase::Unknown | AuthPhase::Unauthenticated => {}
        }

        self.inner.clock.disarm();
        let epoch = self.bump_epoch();
        self.set_phase(AuthPhase::Authenticating);

        let input = LoginInput { email: email.to_owned(), password: password.to_owned() };
        let result = self.inner.service.login(&input).await;

        if self.epoch() != epoch || self.phase() != AuthPhase::Authenticating {
            log::debug!("session: login result discarded, session changed while outstanding");
            return Err(AuthError::Cancelled);
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                log::debug!("session: login failed: {err}");
                self.set_phase(AuthPhase::Unauthenticated);
                return Err(err);
            }
        };

        let session = Session::from(response);
        let user = session.user.clone();
        self.establish(session, epoch)?;
        log::info!("session: signed in as {}", user.id);
        Ok(user)
    }

    /// Install `session`, write it through, arm renewal, enter `Authenticated`.
    fn establish(&self, session: Session, epoch: u64) -> Result<(), AuthError> {
        let access_expires_at = session.access_expires_at;
        if !session.access_valid_at(self.now()) {
            self.set_phase(AuthPhase::Unauthenticated);
            return Err(AuthError::Expired);
        }
        if let Err(err) = self.inner.store.save(&session) {
            log::warn!("session: cannot persist session: {err}");
            self.clear_store();
            self.set_phase(AuthPhase::Unauthenticated);
            return Err(err.into());
        }
        self.inner.state.borrow_mut().session = Some(session);
        self.enter_authenticated(access_expires_at, epoch)
    }

    /// Arm renewal for the installed session, then announce `Authenticated`.
    ///
    /// Listeners only hear about a session whose timer is already armed. If a
    /// listener ends or replaces the session, the caller's result is stale.
    fn enter_authenticated(&self, access_expires_at: OffsetDateTime, epoch: u64) -> Result<(), AuthError> {
        if self.arm_renewal(access_expires_at, epoch) == ArmOutcome::Expired {
            self.end_session();
            return Err(AuthError::Expired);
        }
        self.set_phase(AuthPhase::Authenticated);
        if self.epoch() != epoch {
            log::debug!("session: session changed by a listener while settling");
            return Err(AuthError::Cancelled);
        }
        Ok(())
    }

    // =========================================================================
    // RENEWAL
    // =========================================================================

    fn arm_renewal(&self, access_expires_at: OffsetDateTime, epoch: u64) -> ArmOutcome {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let outcome = self.inner.clock.arm(access_expires_at, async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let manager = AuthSessionManager { inner };
            manager.renew_for(epoch).await;
        });
        if let ArmOutcome::Scheduled(delay) = outcome {
            log::debug!("session: renewal armed in {}s", delay.as_secs());
        }
        outcome
    }

    /// Renew the current session now, outside the timer.
    pub async fn renew(&self) -> RenewOutcome {
        let epoch = self.epoch();
        self.renew_for(epoch).await
    }

    async fn renew_for(&self, epoch: u64) -> RenewOutcome {
        if self.phase() != AuthPhase::Authenticated || self.epoch() != epoch {
            return RenewOutcome::Skipped;
        }
        let Some(session) = self.inner.state.borrow().session.clone() else {
            return RenewOutcome::Skipped;
        };

        // A renewal is in flight from here on; no timer may start another.
        self.inner.clock.disarm();
        self.set_phase(AuthPhase::Renewing);

        if !session.refresh_valid_at(self.now()) {
            return self.terminate(AuthError::Expired);
        }

        let result = self.inner.service.refresh(&session.refresh_token).await;

        if self.epoch() != epoch || self.phase() != AuthPhase::Renewing {
            log::debug!("session: renewal result discarded, session changed while outstanding");
            return RenewOutcome::Skipped;
        }

        match result {
            Ok(grant) => {
                let renewed = session.renewed(grant);
                let access_expires_at = renewed.access_expires_at;
                if let Err(err) = self.inner.store.save(&renewed) {
                    return self.terminate(err.into());
                }
                self.inner.state.borrow_mut().session = Some(renewed);
                match self.enter_authenticated(access_expires_at, epoch) {
                    Ok(()) => {
                        log::debug!("session: renewed");
                        RenewOutcome::Renewed
                    }
                    Err(AuthError::Cancelled) => RenewOutcome::Skipped,
                    Err(err) => {
                        log::warn!("session: renewed tokens already expired, signed out");
                        RenewOutcome::Terminated(err)
                    }
                }
            }
            Err(err) => self.terminate(err),
        }
    }

    /// Renewal failed: end the session. Never retried.
    fn terminate(&self, err: AuthError) -> RenewOutcome {
        log::warn!("session: silent renewal failed, signing out: {err}");
        self.end_session();
        RenewOutcome::Terminated(err)
    }

    // =========================================================================
    // GRANT ADOPTION
    // =========================================================================

    /// Replace the active session's tokens with a grant issued elsewhere
    /// (tenant creation returns tenant-scoped tokens). Cancels any renewal in
    /// flight, since its result would belong to the superseded tokens.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Cancelled`] if no session is active.
    /// - [`AuthError::Expired`] if the grant's access token is already expired.
    /// - [`AuthError::Storage`] if the grant cannot be persisted; the session
    ///   is ended in that case.
    pub fn adopt_grant(&self, grant: TokenGrant) -> Result<(), AuthError> {
        if self.status() != AuthStatus::Authenticated {
            return Err(AuthError::Cancelled);
        }
        let Some(current) = self.inner.state.borrow().session.clone() else {
            return Err(AuthError::Cancelled);
        };
        let renewed = current.renewed(grant);
        if !renewed.access_valid_at(self.now()) {
            return Err(AuthError::Expired);
        }

        self.inner.clock.disarm();
        let epoch = self.bump_epoch();
        if let Err(err) = self.inner.store.save(&renewed) {
            log::warn!("session: cannot persist adopted grant, signing out: {err}");
            self.end_session();
            return Err(err.into());
        }
        let access_expires_at = renewed.access_expires_at;
        self.inner.state.borrow_mut().session = Some(renewed);
        self.enter_authenticated(access_expires_at, epoch)
    }

    // =========================================================================
    // LOGOUT / TEARDOWN
    // =========================================================================

    /// Sign out locally. Always succeeds; no network call.
    pub fn logout(&self) {
        log::info!("session: signed out");
        self.end_session();
    }

    /// Disarm before clear, then drop the in-memory session.
    fn end_session(&self) {
        self.inner.clock.disarm();
        self.clear_store();
        {
            let mut state = self.inner.state.borrow_mut();
            state.session = None;
            state.epoch += 1;
        }
        self.set_phase(AuthPhase::Unauthenticated);
    }

    fn clear_store(&self) {
        if let Err(err) = self.inner.store.clear() {
            log::warn!("session: cannot clear token store: {err}");
        }
    }

    /// Cancel the renewal timer at application teardown. The persisted session
    /// is kept so the next load can bootstrap from it.
    pub fn shutdown(&self) {
        self.inner.clock.disarm();
        self.inner.listeners.borrow_mut().clear();
    }
}
