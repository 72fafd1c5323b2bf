//! Error taxonomy shared by the store, the HTTP layer and the manager.
//!
//! ERROR HANDLING
//! ==============
//! Nothing in this crate retries. Login, registration and tenant failures are
//! returned to the screen that started them; renewal failures are absorbed by
//! the manager, which ends the session instead of surfacing the error.

use serde_json::Value;

/// Failure talking to the backend, or an unsuccessful response envelope.
///
/// `status` is the HTTP status code, or `0` when the request never produced a
/// response (transport failure).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    /// HTTP status code; `0` for transport-level failures.
    pub status: u16,
    /// Human-readable message extracted from the payload.
    pub message: String,
    /// Raw error payload, when the server sent one.
    pub details: Option<Value>,
}

impl ApiError {
    /// Build an error for a request that never reached the server.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self { status: 0, message: message.into(), details: None }
    }

    /// Whether this error came from the transport rather than the server.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.status == 0
    }

    /// Whether the server rejected the caller's credentials.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self.status, 400 | 401 | 403)
    }
}

/// Persistence layer failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backing store could not be reached (disabled storage, quota, SSR).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A stored value exists but cannot be decoded.
    #[error("stored value for `{key}` is corrupt: {reason}")]
    Corrupt { key: &'static str, reason: String },
}

/// Errors returned by session manager operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// Credentials or refresh token rejected by the service.
    #[error("authentication rejected: {message}")]
    Authentication { message: String },
    /// The auth service could not be reached.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with an unexpected failure.
    #[error("auth service error: {0}")]
    Api(ApiError),
    /// Persisting the session failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A login or renewal is already outstanding.
    #[error("another authentication request is already in progress")]
    Busy,
    /// Login was requested while a session is active.
    #[error("a session is already active")]
    SessionActive,
    /// The session was ended while the request was outstanding.
    #[error("session ended before the request completed")]
    Cancelled,
    /// The service issued credentials that are already expired.
    #[error("received credentials are already expired")]
    Expired,
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        if err.is_transport() {
            Self::Network(err.message)
        } else if err.is_rejection() {
            Self::Authentication { message: err.message }
        } else {
            Self::Api(err)
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
