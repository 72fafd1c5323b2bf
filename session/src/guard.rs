//! Route access decisions.
//!
//! Screens declare an [`Access`] kind and ask the guard what to do with the
//! current [`AuthStatus`]. Deciding is pure; applying the decision goes
//! through a [`Navigator`] so the same rules drive the Leptos router in the
//! browser and a recording double in tests.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::config::SessionConfig;
use crate::manager::AuthStatus;

/// Performs route transitions.
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// Who may view a screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Only signed-in users (dashboard).
    RequiresAuth,
    /// Only signed-out users (login, registration).
    PublicOnly,
    /// The root route: forwards everyone somewhere else once status is known.
    Entry,
}

/// What a screen should do right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Status is still loading; render a placeholder and do not redirect.
    Wait,
    Allow,
    Redirect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    landing_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl RouteGuard {
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self { login_path: config.login_path.clone(), landing_path: config.landing_path.clone() }
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    #[must_use]
    pub fn decide(&self, access: Access, status: AuthStatus) -> GuardDecision {
        match (access, status) {
            (_, AuthStatus::Loading) => GuardDecision::Wait,
            (Access::RequiresAuth, AuthStatus::Authenticated)
            | (Access::PublicOnly, AuthStatus::Unauthenticated) => GuardDecision::Allow,
            (Access::RequiresAuth | Access::Entry, AuthStatus::Unauthenticated) => {
                GuardDecision::Redirect(self.login_path.clone())
            }
            (Access::PublicOnly | Access::Entry, AuthStatus::Authenticated) => {
                GuardDecision::Redirect(self.landing_path.clone())
            }
        }
    }

    /// Decide, and navigate when the decision is a redirect.
    pub fn enforce(&self, access: Access, status: AuthStatus, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.decide(access, status);
        if let GuardDecision::Redirect(path) = &decision {
            log::debug!("guard: {access:?} with {status:?}, redirecting to {path}");
            navigator.navigate(path);
        }
        decision
    }
}
