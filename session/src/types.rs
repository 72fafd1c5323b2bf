//! Session model and auth/tenant wire DTOs.
//!
//! DESIGN
//! ======
//! Field names mirror the backend JSON so serde round-trips stay lossless.
//! Timestamps travel as RFC 3339 strings and are parsed into
//! [`OffsetDateTime`] at the boundary; nothing downstream handles raw strings.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identity of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user identifier.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Optional account handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl User {
    /// Name to greet the user with; falls back to the email local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() {
            self.email.split('@').next().unwrap_or_default()
        } else {
            name
        }
    }
}

/// Token fields issued by login, refresh and tenant creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Access token (bearer credential).
    pub token: String,
    /// Refresh token exchanged for a new grant.
    pub refresh_token: String,
    /// Access-token expiry.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// Refresh-token expiry.
    #[serde(with = "time::serde::rfc3339")]
    pub refresh_expires_at: OffsetDateTime,
}

/// Request body for `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Response body of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub grant: TokenGrant,
    pub user: User,
}

/// Request body for `POST /auth/refresh-token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Request body for `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Response body of `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Request body for `POST /auth/register-tenant-trial`.
///
/// Empty optional form fields are sent as absent, not as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTenantInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Response body of `POST /auth/register-tenant-trial`.
///
/// The tenant record is kept opaque; the portal only stores it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TenantResponse {
    #[serde(default)]
    pub tenant: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub refresh_expires_at: Option<OffsetDateTime>,
}

impl TenantResponse {
    /// Token grant carried by the response, if every token field is present.
    #[must_use]
    pub fn grant(&self) -> Option<TokenGrant> {
        Some(TokenGrant {
            token: self.access_token.clone()?,
            refresh_token: self.refresh_token.clone()?,
            expires_at: self.expires_at?,
            refresh_expires_at: self.refresh_expires_at?,
        })
    }
}

/// A fully populated authenticated session.
///
/// There is no partially populated form of this type: either the manager
/// holds a complete `Session` or it holds none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: OffsetDateTime,
    pub refresh_expires_at: OffsetDateTime,
}

impl Session {
    /// Build a session from the user and the grant issued alongside it.
    #[must_use]
    pub fn new(user: User, grant: TokenGrant) -> Self {
        Self {
            user,
            access_token: grant.token,
            refresh_token: grant.refresh_token,
            access_expires_at: grant.expires_at,
            refresh_expires_at: grant.refresh_expires_at,
        }
    }

    /// Same user, every token field replaced by `grant`.
    #[must_use]
    pub fn renewed(&self, grant: TokenGrant) -> Self {
        Self::new(self.user.clone(), grant)
    }

    /// Whether the access token is still valid at `now`.
    #[must_use]
    pub fn access_valid_at(&self, now: OffsetDateTime) -> bool {
        now < self.access_expires_at
    }

    /// Whether the refresh token is still valid at `now`.
    #[must_use]
    pub fn refresh_valid_at(&self, now: OffsetDateTime) -> bool {
        now < self.refresh_expires_at
    }
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Self::new(resp.user, resp.grant)
    }
}
