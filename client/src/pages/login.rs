//! Login page with email + password credentials.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::forms::MSG_LOGIN_FAILED;
use session::{Access, FieldErrors, LoginForm};

use crate::app::use_portal;
use crate::components::field_error::FieldError;
use crate::state::auth::AuthState;
use crate::util::auth::install_route_guard;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let portal = use_portal();
    // A successful login flips auth to signed-in; the guard then forwards to
    // the landing page.
    install_route_guard(auth, portal.with_value(|p| p.guard.clone()), Access::PublicOnly, use_navigate());

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let message = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let form = LoginForm { email: email.get_untracked().trim().to_owned(), password: password.get_untracked() };
        let input = match form.validate() {
            Ok(input) => input,
            Err(field_errors) => {
                errors.set(field_errors);
                return;
            }
        };
        errors.set(FieldErrors::default());
        message.set(None);
        busy.set(true);

        let manager = portal.with_value(|p| p.manager.clone());
        leptos::task::spawn_local(async move {
            let result = manager.login(&input.email, &input.password).await;
            busy.set(false);
            if let Err(err) = result {
                log::debug!("login: {err}");
                message.set(Some(MSG_LOGIN_FAILED.to_owned()));
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Masuk"</h1>
                <p class="login-card__subtitle">"Masuk ke portal tenant"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="nama@contoh.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <FieldError errors=errors field="email"/>
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Kata sandi"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <FieldError errors=errors field="password"/>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Memproses..." } else { "Masuk" }}
                    </button>
                </form>
                <Show when=move || message.get().is_some()>
                    <p class="login-message">{move || message.get().unwrap_or_default()}</p>
                </Show>
                <p class="login-card__footer">
                    "Belum punya akun? "
                    <a href="/register">"Daftar"</a>
                </p>
            </div>
        </div>
    }
}
