//! Outbound HTTP layer and the auth-service contract.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every backend call goes through [`ApiClient`]: it prefixes paths with
//! `/api`, attaches the stored access token as a bearer credential, and
//! unwraps the backend's `{success, message, data}` envelope. The raw HTTP
//! exchange is delegated to an [`HttpTransport`] (`gloo-net` in the browser).
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx statuses and `success: false` envelopes become [`ApiError`]s whose
//! message is taken from the payload's `message`, `error`, or `title` field.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, AuthError};
use crate::store::TokenStore;
use crate::types::{
    CreateTenantInput, LoginInput, LoginResponse, RefreshInput, RegistrationInput, RegistrationResponse,
    TenantResponse, TokenGrant,
};

const API_PREFIX: &str = "/api";

/// HTTP methods used by the portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A fully resolved request handed to the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute path including the `/api` prefix.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Value for the `Authorization` header, if a credential is attached.
    pub authorization: Option<String>,
}

/// Raw response: status code and body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange.
#[async_trait(?Send)]
pub trait HttpTransport {
    /// Send `request` and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] with status `0` when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request).await
    }
}

/// The external authentication service as seen by the session manager.
#[async_trait(?Send)]
pub trait AuthService {
    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// [`AuthError::Authentication`] for rejected credentials,
    /// [`AuthError::Network`] when the service is unreachable.
    async fn login(&self, input: &LoginInput) -> Result<LoginResponse, AuthError>;

    /// Exchange a refresh token for a new token grant.
    ///
    /// # Errors
    ///
    /// [`AuthError::Authentication`] when the refresh token is invalid,
    /// revoked or expired; [`AuthError::Network`] when unreachable.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError>;
}

/// Normalize an endpoint path to live under `/api`.
#[must_use]
pub fn api_path(path: &str) -> String {
    if path.starts_with(API_PREFIX) {
        path.to_owned()
    } else if path.starts_with('/') {
        format!("{API_PREFIX}{path}")
    } else {
        format!("{API_PREFIX}/{path}")
    }
}

/// `Authorization` header value for a bearer token.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Fallback message when the payload names none.
#[must_use]
pub fn status_message(status: u16) -> String {
    format!("Request failed with status {status}")
}

/// Parse a body as JSON, keeping non-JSON text as a string value.
fn parse_payload(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_owned()))
}

fn payload_message(payload: &Value) -> Option<String> {
    ["message", "error", "title"]
        .iter()
        .filter_map(|field| payload.get(field).and_then(Value::as_str))
        .find(|msg| !msg.is_empty())
        .map(str::to_owned)
}

/// Turn a raw response into the payload's `data`, or an [`ApiError`].
///
/// # Errors
///
/// Returns an [`ApiError`] for non-2xx statuses, `success: false` envelopes,
/// and payloads that do not match `T`.
pub fn unwrap_envelope<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let payload = parse_payload(&response.body);

    if !response.is_success() {
        return Err(ApiError {
            status: response.status,
            message: payload_message(&payload).unwrap_or_else(|| status_message(response.status)),
            details: (!payload.is_null()).then_some(payload),
        });
    }

    if payload.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError {
            status: response.status,
            message: payload_message(&payload).unwrap_or_else(|| status_message(response.status)),
            details: Some(payload),
        });
    }

    let data = match payload {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(data).map_err(|e| ApiError {
        status: response.status,
        message: format!("unexpected response payload: {e}"),
        details: None,
    })
}

/// Typed client for the portal backend.
pub struct ApiClient<T> {
    transport: T,
    tokens: Rc<dyn TokenStore>,
}

impl<T: HttpTransport> ApiClient<T> {
    /// `tokens` supplies the bearer credential for every request.
    #[must_use]
    pub fn new(transport: T, tokens: Rc<dyn TokenStore>) -> Self {
        Self { transport, tokens }
    }

    fn authorization(&self) -> Option<String> {
        match self.tokens.access_token() {
            Ok(token) => token.map(|t| bearer(&t)),
            Err(err) => {
                log::warn!("api: cannot read access token, sending unauthenticated: {err}");
                None
            }
        }
    }

    /// `POST` a JSON body and decode the enveloped response.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and envelope errors as [`ApiError`].
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError {
            status: 0,
            message: format!("cannot encode request body: {e}"),
            details: None,
        })?;
        self.request(Method::Post, path, Some(body)).await
    }

    /// `GET` a path and decode the enveloped response.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and envelope errors as [`ApiError`].
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.request(Method::Get, path, None).await
    }

    async fn request<R: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> Result<R, ApiError> {
        let request = HttpRequest { method, path: api_path(path), body, authorization: self.authorization() };
        log::debug!("api: {} {}", method.as_str(), request.path);
        let response = self.transport.send(request).await?;
        unwrap_envelope(&response)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns the server's [`ApiError`] (e.g. email already registered).
    pub async fn register(&self, input: &RegistrationInput) -> Result<RegistrationResponse, ApiError> {
        self.post("/auth/register", input).await
    }

    /// Create a trial tenant for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns the server's [`ApiError`].
    pub async fn create_tenant(&self, input: &CreateTenantInput) -> Result<TenantResponse, ApiError> {
        self.post("/auth/register-tenant-trial", input).await
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport> AuthService for ApiClient<T> {
    async fn login(&self, input: &LoginInput) -> Result<LoginResponse, AuthError> {
        Ok(self.post("/auth/login", input).await?)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let input = RefreshInput { refresh_token: refresh_token.to_owned() };
        Ok(self.post("/auth/refresh-token", &input).await?)
    }
}
