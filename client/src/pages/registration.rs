//! Account registration page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Registration does not sign the user in. A successful submit shows the
//! confirmation and sends the user to the login screen.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use session::forms::{MSG_REGISTRATION_FAILED, MSG_REGISTRATION_SUCCEEDED, failure_message};
use session::{Access, FieldErrors, RegistrationForm};

use crate::app::use_portal;
use crate::components::field_error::FieldError;
use crate::state::auth::AuthState;
use crate::util::auth::install_route_guard;

#[component]
pub fn RegistrationPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let portal = use_portal();
    let guard = portal.with_value(|p| p.guard.clone());
    let login_path = guard.login_path().to_owned();
    let navigate = use_navigate();
    install_route_guard(auth, guard, Access::PublicOnly, navigate.clone());

    let full_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);
    let registered = RwSignal::new(false);

    Effect::new(move || {
        if registered.get() {
            navigate(&login_path, NavigateOptions::default());
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let form = RegistrationForm {
            full_name: full_name.get_untracked().trim().to_owned(),
            email: email.get_untracked().trim().to_owned(),
            password: password.get_untracked(),
            confirm_password: confirm_password.get_untracked(),
        };
        let input = match form.validate() {
            Ok(input) => input,
            Err(field_errors) => {
                errors.set(field_errors);
                return;
            }
        };
        errors.set(FieldErrors::default());
        error.set(None);
        busy.set(true);

        let api = portal.with_value(|p| Rc::clone(&p.api));
        leptos::task::spawn_local(async move {
            let result = api.register(&input).await;
            busy.set(false);
            match result {
                Ok(account) => {
                    log::info!("registration: created account {}", account.id);
                    notice.set(Some(MSG_REGISTRATION_SUCCEEDED.to_owned()));
                    registered.set(true);
                }
                Err(err) => {
                    log::debug!("registration: {err}");
                    error.set(Some(failure_message(&err, MSG_REGISTRATION_FAILED)));
                }
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Daftar"</h1>
                <p class="login-card__subtitle">"Buat akun portal tenant"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        placeholder="Nama lengkap"
                        prop:value=move || full_name.get()
                        on:input=move |ev| full_name.set(event_target_value(&ev))
                    />
                    <FieldError errors=errors field="full_name"/>
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
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Konfirmasi kata sandi"
                        prop:value=move || confirm_password.get()
                        on:input=move |ev| confirm_password.set(event_target_value(&ev))
                    />
                    <FieldError errors=errors field="confirm_password"/>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Memproses..." } else { "Daftar" }}
                    </button>
                </form>
                <Show when=move || error.get().is_some()>
                    <p class="login-message">{move || error.get().unwrap_or_default()}</p>
                </Show>
                <Show when=move || notice.get().is_some()>
                    <p class="login-message login-message--success">{move || notice.get().unwrap_or_default()}</p>
                </Show>
                <p class="login-card__footer">
                    "Sudah punya akun? "
                    <a href="/login">"Masuk"</a>
                </p>
            </div>
        </div>
    }
}
