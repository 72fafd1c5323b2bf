//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The app root is the only place a session manager is built. It is shared
//! with pages as a [`PortalHandle`] context; the manager pushes every status
//! change into the reactive [`AuthState`] signal that guards and components
//! read.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};
use session::{ApiClient, AuthSessionManager, KeyValueTokenStore, RouteGuard, SessionConfig, TokenStore};

use crate::net::api::FetchTransport;
use crate::pages::{dashboard::DashboardPage, home::HomePage, login::LoginPage, registration::RegistrationPage};
use crate::state::auth::AuthState;
use crate::util::storage::BrowserStorage;
use crate::util::timer::{BrowserTime, BrowserTimer};

/// Session services shared by every page.
#[derive(Clone)]
pub struct Portal {
    pub manager: AuthSessionManager,
    pub api: Rc<ApiClient<FetchTransport>>,
    pub guard: RouteGuard,
}

impl Portal {
    /// Wire the manager, API client and guard to browser adapters.
    pub fn new(config: &SessionConfig) -> Self {
        let store: Rc<dyn TokenStore> = Rc::new(KeyValueTokenStore::new(BrowserStorage));
        let api = Rc::new(ApiClient::new(FetchTransport, Rc::clone(&store)));
        let manager = AuthSessionManager::new(
            api.clone(),
            store,
            Rc::new(BrowserTimer),
            Rc::new(BrowserTime),
            config,
        );
        Self { manager, api, guard: RouteGuard::from_config(config) }
    }
}

/// `Portal` holds `Rc`s, so it lives in local arena storage.
pub type PortalHandle = StoredValue<Portal, LocalStorage>;

/// The portal services provided by [`App`].
pub fn use_portal() -> PortalHandle {
    expect_context::<PortalHandle>()
}

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let auth = RwSignal::new(AuthState::default());
    let portal = Portal::new(&SessionConfig::default());

    let listener = portal.manager.subscribe(move |snapshot| auth.set(AuthState::from(snapshot)));
    portal.manager.bootstrap();

    let handle: PortalHandle = StoredValue::new_local(portal);
    provide_context(auth);
    provide_context(handle);

    on_cleanup(move || {
        let manager = handle.with_value(|p| p.manager.clone());
        manager.unsubscribe(listener);
        manager.shutdown();
    });

    view! {
        <Title text="Tenant Portal"/>

        <Router>
            <Routes fallback=|| "Halaman tidak ditemukan.".into_view()>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register") view=RegistrationPage/>
                <Route path=StaticSegment("dashboard") view=DashboardPage/>
            </Routes>
        </Router>
    }
}
