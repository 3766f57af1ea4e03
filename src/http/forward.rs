//! Upstream forwarder.
//!
//! Relays `<mount>/{*path}` to `<upstream>/<path>?<query>` for GET, POST, PUT,
//! PATCH and DELETE. The request body is re-encoded according to its content
//! type; the upstream response is relayed untouched apart from header scrubbing.
//! Transport failures never escape the handler: they become a 502 JSON body.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{multipart::MultipartError, FromRequest, Multipart, Path, State},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use url::Url;

use crate::http::request::{forwardable_headers, RequestIdExt};
use crate::http::response::{self, error_response, proxy_error};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Proxy-internal failures.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to read multipart body: {0}")]
    Multipart(String),

    #[error("request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("failed to read upstream response: {0}")]
    ResponseBody(#[source] reqwest::Error),
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            Self::PayloadTooLarge { .. } => {
                error_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", &self)
            }
            _ => proxy_error(&self),
        }
    }
}

/// Outcome of re-encoding a JSON request body.
#[derive(Debug)]
pub enum JsonBody {
    /// Parsed and serialized again.
    Reencoded(Vec<u8>),
    /// Nothing but whitespace was sent.
    Empty,
    /// Not valid JSON; forwarded as no body.
    Malformed(serde_json::Error),
}

impl JsonBody {
    pub fn classify(raw: &[u8]) -> Self {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        match serde_json::from_slice::<serde_json::Value>(raw) {
            Ok(value) => match serde_json::to_vec(&value) {
                Ok(bytes) => Self::Reencoded(bytes),
                Err(e) => Self::Malformed(e),
            },
            Err(e) => Self::Malformed(e),
        }
    }

    fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Reencoded(bytes) => Some(bytes),
            Self::Empty => None,
            Self::Malformed(e) => {
                tracing::debug!(error = %e, "Dropping malformed JSON request body");
                None
            }
        }
    }
}

/// Request body as it will be sent upstream.
#[derive(Debug)]
pub enum ForwardBody {
    None,
    Json(Vec<u8>),
    Multipart(Form),
    Raw(Bytes),
}

impl ForwardBody {
    /// Read and re-encode the inbound body, branching on its content type.
    pub async fn read(request: Request<Body>, max_body_size: usize) -> Result<Self, ForwardError> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.contains("multipart/form-data") {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| ForwardError::Multipart(e.body_text()))?;
            return Ok(Self::Multipart(rebuild_form(multipart, max_body_size).await?));
        }

        let raw = read_limited(request.into_body(), max_body_size).await?;
        if content_type.contains("application/json") {
            return Ok(JsonBody::classify(&raw.unwrap_or_default())
                .into_bytes()
                .map_or(Self::None, Self::Json));
        }
        Ok(raw.map_or(Self::None, Self::Raw))
    }

    fn apply(self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::None => builder,
            Self::Json(bytes) => builder.body(bytes),
            Self::Multipart(form) => builder.multipart(form),
            Self::Raw(bytes) => builder.body(bytes),
        }
    }
}

/// Buffer a body up to `limit` bytes.
///
/// Exceeding the limit is an error; any other read failure yields `None` and the
/// request is forwarded without a body.
async fn read_limited(body: Body, limit: usize) -> Result<Option<Bytes>, ForwardError> {
    match axum::body::to_bytes(body, limit).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if exceeds_limit(&e) => Err(ForwardError::PayloadTooLarge { limit }),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body, forwarding without one");
            Ok(None)
        }
    }
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

fn multipart_error(error: MultipartError, limit: usize) -> ForwardError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ForwardError::PayloadTooLarge { limit }
    } else {
        ForwardError::Multipart(error.body_text())
    }
}

/// Copy every multipart field into a fresh form; the transport writes a new boundary.
async fn rebuild_form(mut multipart: Multipart, limit: usize) -> Result<Form, ForwardError> {
    let mut form = Form::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

        let mut part = Part::bytes(data.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ForwardError::Multipart(e.to_string()))?;
        }
        form = form.part(name, part);
    }
    Ok(form)
}

/// Forwarder handler, mounted for every supported method.
pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request.request_id().to_string();
    let target = state.upstream.join(path.split('/'), request.uri().query());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Forwarding request"
    );

    match relay(&state, target.clone(), request).await {
        Ok(response) => {
            let status = response.status();
            tracing::info!(
                request_id = %request_id,
                method = %method,
                target = %target,
                status = status.as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Forwarded"
            );
            metrics::record_request(method.as_str(), status.as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                target = %target,
                error = %e,
                "Proxy error"
            );
            let response = e.into_response();
            metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
            response
        }
    }
}

async fn relay(state: &AppState, target: Url, request: Request<Body>) -> Result<Response, ForwardError> {
    let method = request.method().clone();
    let mut headers = forwardable_headers(request.headers());

    let body = if method == Method::GET || method == Method::HEAD {
        ForwardBody::None
    } else {
        ForwardBody::read(request, state.max_body_size).await?
    };

    if matches!(body, ForwardBody::Multipart(_)) {
        headers.remove(CONTENT_TYPE);
    }

    let builder = state.client.request(method, target).headers(headers);
    let upstream = body
        .apply(builder)
        .send()
        .await
        .map_err(ForwardError::Upstream)?;

    response::relay(upstream)
        .await
        .map_err(ForwardError::ResponseBody)
}
