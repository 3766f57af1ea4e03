//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response (status, headers, opaque body) to the browser
//! - Strip headers the outer HTTP layer must recompute
//! - Render proxy-internal failures as a 502 JSON body
//!
//! # Design Decisions
//! - Upstream bodies are never interpreted; any content type passes through
//! - Upstream error statuses are relayed as-is, only transport failures become 502

use axum::{
    body::Body,
    http::{
        header::{CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING},
        HeaderMap, HeaderName, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Upstream response headers that must not be copied verbatim.
pub const STRIPPED_RESPONSE_HEADERS: [HeaderName; 3] =
    [CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING];

/// Body of a proxy-internal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyErrorBody {
    pub error: String,
    pub details: String,
}

/// Copy upstream response headers minus the stripped set.
pub fn sanitize_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in STRIPPED_RESPONSE_HEADERS.iter() {
        headers.remove(name);
    }
    headers
}

/// Buffer the upstream body as an opaque blob and build the relayed response.
pub async fn relay(upstream: reqwest::Response) -> Result<Response, reqwest::Error> {
    let status = upstream.status();
    let headers = sanitize_response_headers(upstream.headers());
    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// A `502 Bad Gateway` with `{"error": "Proxy Error", "details": ...}`.
pub fn proxy_error(details: impl std::fmt::Display) -> Response {
    error_response(StatusCode::BAD_GATEWAY, "Proxy Error", details)
}

/// A gateway-generated failure in the same `{error, details}` shape.
pub fn error_response(status: StatusCode, error: &str, details: impl std::fmt::Display) -> Response {
    let body = ProxyErrorBody {
        error: error.to_string(),
        details: details.to_string(),
    };
    (status, Json(body)).into_response()
}
