//! Root route: forwards to the dashboard or the login screen.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::Access;

use crate::app::use_portal;
use crate::state::auth::AuthState;
use crate::util::auth::install_route_guard;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let guard = use_portal().with_value(|p| p.guard.clone());
    install_route_guard(auth, guard, Access::Entry, use_navigate());

    view! { <div class="page-loading">"Memuat..."</div> }
}
