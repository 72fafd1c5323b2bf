//! Inline validation message under a form input.

use leptos::prelude::*;
use session::FieldErrors;

/// Shows the message for `field`, if any.
#[component]
pub fn FieldError(errors: RwSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors
            .with(|e| e.get(field))
            .map(|message| view! { <p class="form-field__error">{message}</p> })
    }
}
