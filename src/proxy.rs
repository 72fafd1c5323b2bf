//! `/api/*` reverse proxy to the backend service.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser client calls same-origin `/api/...` paths. This handler
//! rewrites `/api/<rest>` to `<API_URL>/<rest>`, keeps method, query string,
//! body and end-to-end headers, and relays the upstream response untouched.
//!
//! ERROR HANDLING
//! ==============
//! An upstream that cannot be reached (refused, timed out, bad response)
//! becomes `502 Bad Gateway` with a JSON `{"message": ...}` body, the same
//! shape the backend uses for its own errors. Request bodies are never logged
//! since they carry credentials.

#[cfg(test)]
#[path = "proxy_test.rs"]
mod proxy_test;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Mount point stripped from incoming paths before forwarding.
pub const API_PREFIX: &str = "/api";

/// Largest request body the proxy will buffer.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Connection-scoped headers that must not cross a proxy (RFC 9110 §7.6.1),
/// plus the ones the outbound client recomputes.
const SKIPPED_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_skipped(name: &HeaderName) -> bool {
    SKIPPED_HEADERS.contains(&name.as_str())
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("request body unreadable: {0}")]
    Body(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Body(_) => (StatusCode::BAD_REQUEST, "invalid request body"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream service unavailable"),
        };
        let body = serde_json::json!({ "message": message }).to_string();
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

/// Build the upstream URL for an incoming request path and query.
///
/// `path` is the full incoming path (`/api/auth/login`); the mount prefix is
/// stripped and the remainder appended to `base`.
#[must_use]
pub fn upstream_url(base: &str, path: &str, query: Option<&str>) -> String {
    let rest = path.strip_prefix(API_PREFIX).unwrap_or(path);
    let rest = rest.trim_start_matches('/');
    let mut url = format!("{base}/{rest}");
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Copy `headers`, dropping hop-by-hop and length headers.
#[must_use]
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_skipped(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Forward one request to the backend and relay its response.
pub async fn forward(State(state): State<AppState>, req: Request) -> Result<Response, ProxyError> {
    let (parts, body) = req.into_parts();
    let url = upstream_url(&state.config.api_url, parts.uri.path(), parts.uri.query());
    let body: Bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ProxyError::Body(e.to_string()))?;

    let upstream = state
        .http
        .request(parts.method.clone(), &url)
        .headers(forwardable_headers(&parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(method = %parts.method, path = %parts.uri.path(), error = %e, "proxy: upstream failed");
            ProxyError::Upstream(e)
        })?;

    let status = upstream.status();
    let headers = forwardable_headers(upstream.headers());
    let bytes = upstream.bytes().await?;
    tracing::debug!(method = %parts.method, path = %parts.uri.path(), %status, "proxy: relayed");

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
