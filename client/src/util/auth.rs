//! Shared route-guard wiring.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page declares its [`Access`] kind and installs the same guard effect,
//! so redirect behavior stays identical across routes. Redirects are
//! re-evaluated whenever the auth signal changes, which is how a failed
//! background renewal sends the user to the login screen.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use session::{Access, Navigator, RouteGuard};

use crate::state::auth::AuthState;

/// Adapts a Leptos router `navigate` function to [`Navigator`].
pub struct RouterNavigator<F>(pub F);

impl<F> Navigator for RouterNavigator<F>
where
    F: Fn(&str, NavigateOptions),
{
    fn navigate(&self, path: &str) {
        (self.0)(path, NavigateOptions { replace: true, ..NavigateOptions::default() });
    }
}

/// Re-run `guard` for `access` on every auth change.
pub fn install_route_guard<F>(auth: RwSignal<AuthState>, guard: RouteGuard, access: Access, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let navigator = RouterNavigator(navigate);
    Effect::new(move || {
        let status = auth.get().status();
        guard.enforce(access, status, &navigator);
    });
}
