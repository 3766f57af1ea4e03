//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the browser sent none
//! - Prepare inbound headers for forwarding to the upstream API
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, and forwarded upstream
//! - Transport-specific headers are never copied; the outgoing request recomputes them

use axum::http::{
    header::{ACCEPT, ACCEPT_ENCODING, CONNECTION, CONTENT_LENGTH, HOST},
    HeaderMap, HeaderName, HeaderValue, Request,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Inbound headers that must be recomputed by the outgoing request.
pub const STRIPPED_REQUEST_HEADERS: [HeaderName; 3] = [HOST, CONNECTION, CONTENT_LENGTH];

/// Generates a UUID v4 request ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Convenience accessor for the correlation ID of a request.
pub trait RequestIdExt {
    /// The request ID, or `"unknown"` when the header is missing or not UTF-8.
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Copy inbound headers for the upstream request.
///
/// Drops `host`, `connection` and `content-length`, plus `accept-encoding` so the
/// transport only negotiates encodings it can decode (the response relay strips
/// `content-encoding`). Forces `Accept: application/json`.
pub fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in STRIPPED_REQUEST_HEADERS.iter() {
        headers.remove(name);
    }
    headers.remove(ACCEPT_ENCODING);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};

    #[test]
    fn test_forwardable_headers_scrubs_transport_headers() {
        let mut inbound = HeaderMap::new();
        inbound.insert(HOST, HeaderValue::from_static("localhost:3000"));
        inbound.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        inbound.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, zstd"));
        inbound.insert(ACCEPT, HeaderValue::from_static("text/html"));
        inbound.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        inbound.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let headers = forwardable_headers(&inbound);

        assert!(headers.get(HOST).is_none());
        assert!(headers.get(CONNECTION).is_none());
        assert!(headers.get(CONTENT_LENGTH).is_none());
        assert!(headers.get(ACCEPT_ENCODING).is_none());
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_request_id_accessor() {
        let req = Request::builder()
            .header("x-request-id", "req-123")
            .body(())
            .unwrap();
        assert_eq!(req.request_id(), "req-123");

        let bare = Request::builder().body(()).unwrap();
        assert_eq!(bare.request_id(), "unknown");
    }

    #[test]
    fn test_make_request_id_is_uuid() {
        let req = Request::builder().body(()).unwrap();
        let id = MakeRequestUuidV4.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
