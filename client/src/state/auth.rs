//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors the session manager's snapshot into a signal. Route guards and
//! user-aware components read this; only the manager's listener writes it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use session::{AuthSnapshot, AuthStatus, User};

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True until the stored session has been checked.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, loading: true }
    }
}

impl AuthState {
    pub fn status(&self) -> AuthStatus {
        if self.loading {
            AuthStatus::Loading
        } else if self.user.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        }
    }
}

impl From<&AuthSnapshot> for AuthState {
    fn from(snapshot: &AuthSnapshot) -> Self {
        Self { user: snapshot.user.clone(), loading: snapshot.is_loading() }
    }
}
