//! # client
//!
//! Leptos + WASM frontend for the tenant portal.
//!
//! This crate renders the login, registration and dashboard screens and wires
//! the `session` crate to the browser: `localStorage` for tokens, `gloo`
//! timers for silent renewal, `gloo-net` for HTTP, and the Leptos router for
//! guard redirects. Browser-only code is gated behind the `csr` feature so the
//! crate still builds and tests natively.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&format!("logger already installed: {err}").into());
    }
    leptos::mount::mount_to_body(app::App);
}
