//! Dashboard page: signed-in landing route with tenant creation.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the authenticated landing route. It renders nothing until auth has
//! resolved, and the guard sends signed-out viewers (including anyone whose
//! background renewal just failed) to the login screen.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::{Access, AuthStatus};

use crate::app::use_portal;
use crate::components::create_tenant_modal::CreateTenantModal;
use crate::state::auth::AuthState;
use crate::util::auth::install_route_guard;
use crate::util::storage::{TENANT_KEY, load_json};

/// Header greeting for the signed-in user.
fn greeting(state: &AuthState) -> String {
    match &state.user {
        Some(user) => format!("Halo, {}", user.display_name()),
        None => "Halo".to_owned(),
    }
}

/// Display name of a stored tenant record, if it carries one.
fn tenant_label(tenant: &serde_json::Value) -> Option<String> {
    let name = tenant.get("name")?.as_str()?.trim();
    if name.is_empty() { None } else { Some(name.to_owned()) }
}

/// Label of the tenant saved by the last successful creation.
fn stored_tenant_label() -> Option<String> {
    match load_json::<serde_json::Value>(TENANT_KEY) {
        Ok(tenant) => tenant.as_ref().and_then(tenant_label),
        Err(err) => {
            log::debug!("dashboard: no stored tenant: {err}");
            None
        }
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let portal = use_portal();
    install_route_guard(auth, portal.with_value(|p| p.guard.clone()), Access::RequiresAuth, use_navigate());

    let show_create = RwSignal::new(false);
    let notice = RwSignal::new(None::<String>);
    let tenant = RwSignal::new(stored_tenant_label());

    let on_logout = move |_| {
        let manager = portal.with_value(|p| p.manager.clone());
        manager.logout();
    };
    let on_create = move |_| {
        notice.set(None);
        show_create.set(true);
    };
    let on_close = Callback::new(move |()| show_create.set(false));
    let on_created = Callback::new(move |message: String| {
        show_create.set(false);
        tenant.set(stored_tenant_label());
        notice.set(Some(message));
    });

    view! {
        <Show
            when=move || auth.with(|a| a.status() == AuthStatus::Authenticated)
            fallback=|| view! { <div class="page-loading">"Memuat..."</div> }
        >
            <div class="dashboard-page">
                <header class="dashboard-page__header">
                    <h1>"Dasbor"</h1>
                    <span class="dashboard-page__user">{move || greeting(&auth.get())}</span>
                    <span class="dashboard-page__email">
                        {move || auth.get().user.map(|u| u.email).unwrap_or_default()}
                    </span>
                    <button class="button button--ghost" on:click=on_logout>
                        "Keluar"
                    </button>
                </header>
                <section class="dashboard-page__body">
                    <Show when=move || tenant.get().is_some()>
                        <p class="dashboard-page__tenant">
                            "Tenant: " {move || tenant.get().unwrap_or_default()}
                        </p>
                    </Show>
                    <button class="button" on:click=on_create>
                        "Buat Tenant"
                    </button>
                    <Show when=move || notice.get().is_some()>
                        <p class="dashboard-page__notice">{move || notice.get().unwrap_or_default()}</p>
                    </Show>
                </section>
                <Show when=move || show_create.get()>
                    <CreateTenantModal on_close=on_close on_created=on_created/>
                </Show>
            </div>
        </Show>
    }
}
