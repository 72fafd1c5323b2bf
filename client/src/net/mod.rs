//! Networking: the browser HTTP transport behind `session::ApiClient`.

pub mod api;
