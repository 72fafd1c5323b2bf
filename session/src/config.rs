//! Session tuning knobs.

use time::Duration;

/// How long before access-token expiry a silent renewal is attempted.
pub const DEFAULT_RENEWAL_LEAD: Duration = Duration::minutes(5);
/// Public entry point unauthenticated viewers are sent to.
pub const DEFAULT_LOGIN_PATH: &str = "/login";
/// Landing screen for authenticated viewers.
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub renewal_lead: Duration,
    pub login_path: String,
    pub landing_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            renewal_lead: DEFAULT_RENEWAL_LEAD,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            landing_path: DEFAULT_LANDING_PATH.to_owned(),
        }
    }
}
