//! Browser HTTP transport.
//!
//! Client-side (csr): real HTTP calls via `gloo-net`.
//! Native builds: every request fails as a transport error, since there is no
//! browser `fetch` to call.
//!
//! ERROR HANDLING
//! ==============
//! Anything that prevents a response from arriving becomes an
//! [`ApiError`] with status `0`; the session layer maps that to a network
//! failure. Non-2xx responses are returned as-is for envelope decoding.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use async_trait::async_trait;
use session::ApiError;
use session::api::{HttpRequest, HttpResponse, HttpTransport};

/// `fetch`-backed [`HttpTransport`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

#[cfg(any(test, not(feature = "csr")))]
fn unavailable_message(request: &HttpRequest) -> String {
    format!("{} {}: fetch is only available in the browser", request.method.as_str(), request.path)
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        #[cfg(feature = "csr")]
        {
            use gloo_net::http::Request;
            use session::api::Method;

            let builder = match request.method {
                Method::Get => Request::get(&request.path),
                Method::Post => Request::post(&request.path),
            };
            let mut builder = builder.header("Accept", "application/json");
            if let Some(value) = request.authorization.as_deref() {
                builder = builder.header("Authorization", value);
            }
            let sent = match &request.body {
                Some(body) => builder.json(body).map_err(|e| ApiError::transport(e.to_string()))?.send().await,
                None => builder.send().await,
            };
            let response = sent.map_err(|e| ApiError::transport(e.to_string()))?;
            let status = response.status();
            let body = response.text().await.map_err(|e| ApiError::transport(e.to_string()))?;
            Ok(HttpResponse { status, body })
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(ApiError::transport(unavailable_message(&request)))
        }
    }
}
