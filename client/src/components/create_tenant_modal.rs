//! Modal dialog for creating a trial tenant from the dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Tenant creation may return tenant-scoped tokens. Those go through the
//! session manager so the token store keeps a single writer and the renewal
//! timer follows the new expiry.

use std::rc::Rc;

use leptos::prelude::*;
use session::forms::{MSG_TENANT_FAILED, failure_message, tenant_success_message};
use session::types::TenantResponse;
use session::{AuthSessionManager, CreateTenantForm, FieldErrors};

use crate::app::use_portal;
use crate::components::field_error::FieldError;
use crate::util::storage::{TENANT_KEY, save_json};

fn apply_tenant_response(manager: &AuthSessionManager, response: &TenantResponse) {
    if let Some(tenant) = &response.tenant {
        if let Err(err) = save_json(TENANT_KEY, tenant) {
            log::warn!("tenant: cannot store tenant record: {err}");
        }
    }
    if let Some(grant) = response.grant() {
        if let Err(err) = manager.adopt_grant(grant) {
            log::warn!("tenant: cannot adopt tenant tokens: {err}");
        }
    }
}

/// Tenant form in a backdrop dialog. `on_created` receives the confirmation text.
#[component]
pub fn CreateTenantModal(on_close: Callback<()>, on_created: Callback<String>) -> impl IntoView {
    let portal = use_portal();

    let name = RwSignal::new(String::new());
    let domain = RwSignal::new(String::new());
    let contact_email = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let address = RwSignal::new(String::new());
    let errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let form = CreateTenantForm {
            name: name.get_untracked().trim().to_owned(),
            domain: domain.get_untracked().trim().to_owned(),
            contact_email: contact_email.get_untracked().trim().to_owned(),
            phone: phone.get_untracked().trim().to_owned(),
            address: address.get_untracked().trim().to_owned(),
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

        let (api, manager) = portal.with_value(|p| (Rc::clone(&p.api), p.manager.clone()));
        leptos::task::spawn_local(async move {
            let result = api.create_tenant(&input).await;
            busy.set(false);
            match result {
                Ok(response) => {
                    apply_tenant_response(&manager, &response);
                    on_created.run(tenant_success_message(&response));
                }
                Err(err) => {
                    log::debug!("tenant: create failed: {err}");
                    error.set(Some(failure_message(&err, MSG_TENANT_FAILED)));
                }
            }
        });
    };

    let on_backdrop = move |_| on_close.run(());
    let on_cancel = move |_| on_close.run(());

    view! {
        <div class="modal__backdrop" on:click=on_backdrop>
            <div class="modal" on:click=move |ev| ev.stop_propagation()>
                <div class="modal__header">
                    <h2>"Buat Tenant"</h2>
                </div>
                <form class="modal__form" on:submit=on_submit>
                    <label class="form-field">
                        "Nama"
                        <input
                            type="text"
                            prop:value=move || name.get()
                            on:input=move |ev| name.set(event_target_value(&ev))
                        />
                        <FieldError errors=errors field="name"/>
                    </label>
                    <label class="form-field">
                        "Domain"
                        <input
                            type="text"
                            prop:value=move || domain.get()
                            on:input=move |ev| domain.set(event_target_value(&ev))
                        />
                        <FieldError errors=errors field="domain"/>
                    </label>
                    <label class="form-field">
                        "Email Kontak"
                        <input
                            type="email"
                            prop:value=move || contact_email.get()
                            on:input=move |ev| contact_email.set(event_target_value(&ev))
                        />
                        <FieldError errors=errors field="contact_email"/>
                    </label>
                    <label class="form-field">
                        "Telepon"
                        <input
                            type="tel"
                            prop:value=move || phone.get()
                            on:input=move |ev| phone.set(event_target_value(&ev))
                        />
                        <FieldError errors=errors field="phone"/>
                    </label>
                    <label class="form-field">
                        "Alamat"
                        <textarea
                            prop:value=move || address.get()
                            on:input=move |ev| address.set(event_target_value(&ev))
                        ></textarea>
                    </label>
                    <Show when=move || error.get().is_some()>
                        <p class="form-error">{move || error.get().unwrap_or_default()}</p>
                    </Show>
                    <div class="modal__actions">
                        <button type="button" class="button button--ghost" on:click=on_cancel>
                            "Batal"
                        </button>
                        <button type="submit" class="button" disabled=move || busy.get()>
                            {move || if busy.get() { "Menyimpan..." } else { "Simpan" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
