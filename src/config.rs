//! Portal host configuration parsed from environment variables.
//!
//! Required:
//! - `API_URL`: backend base URL that `/api/*` is forwarded to
//!
//! Optional:
//! - `PORT`: listen port, default 3000
//! - `SITE_DIR`: directory holding the built client bundle, default `client/dist`
//! - `PROXY_TIMEOUT_SECS`: upstream request timeout, default 30

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SITE_DIR: &str = "client/dist";
pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },
    #[error("{var} is not an absolute http(s) URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    pub port: u16,
    pub site_dir: PathBuf,
    pub proxy_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("API_URL").map_err(|_| ConfigError::Missing { var: "API_URL" })?;
        let api_url = normalize_base_url(&raw)?;
        let site_dir = std::env::var("SITE_DIR").unwrap_or_else(|_| DEFAULT_SITE_DIR.to_owned());

        Ok(Self {
            api_url,
            port: env_parse("PORT", DEFAULT_PORT),
            site_dir: PathBuf::from(site_dir),
            proxy_timeout_secs: env_parse("PROXY_TIMEOUT_SECS", DEFAULT_PROXY_TIMEOUT_SECS),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Missing { var: "API_URL" });
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl { var: "API_URL", value: raw.to_owned() });
    }
    Ok(trimmed.to_owned())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
