//! Shared host state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the upstream HTTP client (one connection pool for every proxied
//! request) and the parsed configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.proxy_timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http, config: Arc::new(config) })
    }
}
