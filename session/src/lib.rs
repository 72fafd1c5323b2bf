//! Client-side session lifecycle for the tenant portal.
//!
//! This crate owns everything about an authenticated browser session that is
//! not rendering: persisting tokens, scheduling silent renewal ahead of
//! access-token expiry, the login/renewal/logout state machine, and the route
//! guard that screens consult before they render.
//!
//! ARCHITECTURE
//! ============
//! Every environment-specific concern sits behind a trait so the same state
//! machine runs in the browser (`client` crate adapters) and in native tests:
//!
//! - [`store::KeyValueStore`]: durable string storage (`localStorage`).
//! - [`clock::TimerDriver`] / [`clock::TimeSource`]: timers and wall clock.
//! - [`api::HttpTransport`]: raw HTTP exchange.
//! - [`guard::Navigator`]: route transitions.
//!
//! Execution is single-threaded and cooperative, so shared state is
//! `Rc<RefCell<_>>` and async traits are `?Send`.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod forms;
pub mod guard;
pub mod manager;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, AuthService, HttpTransport};
pub use clock::{SessionClock, SystemTimeSource, TimeSource, TimerDriver};
#[cfg(feature = "tokio")]
pub use clock::TokioTimer;
pub use config::SessionConfig;
pub use error::{ApiError, AuthError, StorageError};
pub use forms::{CreateTenantForm, FieldErrors, LoginForm, RegistrationForm};
pub use guard::{Access, GuardDecision, Navigator, RouteGuard};
pub use manager::{AuthPhase, AuthSessionManager, AuthSnapshot, AuthStatus, ListenerId, RenewOutcome};
pub use store::{KeyValueStore, KeyValueTokenStore, MemoryStore, TokenStore};
pub use types::{Session, TokenGrant, User};
