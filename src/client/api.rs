// Typed API client
//
// Single choke point for outbound API calls. Builds the URL and headers,
// serializes the body, then turns every response into either a decoded value
// or exactly one `ApiError`. A 401 terminates the session before the error is
// returned, so no caller can observe stale authenticated state.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::client::environment::Environment;
use crate::client::error::{ApiError, Error, ResponseBody};
use crate::client::request::{FormValue, RequestOptions, UploadFile, UploadOptions};
use crate::client::session::Session;

/// HTTP client for the dashboard's backend API.
pub struct ApiClient {
    http: reqwest::Client,
    environment: Environment,
    base_url: String,
    session: Arc<Session>,
    locale: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client with a default transport.
    ///
    /// `timeout` bounds each call; `None` keeps the transport default.
    pub fn new(
        environment: Environment,
        session: Arc<Session>,
        timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, environment, session))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, environment: Environment, session: Arc<Session>) -> Self {
        let base_url = environment.base_url();
        Self {
            http,
            environment,
            base_url,
            session,
            locale: RwLock::new(None),
        }
    }

    /// Base URL relative endpoints are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Replace the in-memory bearer token.
    pub fn set_token(&self, token: Option<String>) {
        self.session.set_token(token);
    }

    /// Locale sent as `Accept-Language` on every request.
    pub fn set_locale(&self, locale: Option<String>) {
        *self.locale.write().unwrap_or_else(PoisonError::into_inner) = locale;
    }

    pub fn locale(&self) -> Option<String> {
        self.locale
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── Verbs ────────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<T, Error> {
        self.send_json::<T, ()>(Method::GET, endpoint, None, options)
            .await
    }

    pub async fn post<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, endpoint, body, options).await
    }

    pub async fn put<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, endpoint, body, options).await
    }

    pub async fn patch<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, endpoint, body, options).await
    }

    pub async fn delete<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::DELETE, endpoint, body, options).await
    }

    /// Send a multipart body: the primary file under `options.field_name`,
    /// followed by the auxiliary fields. The transport sets the content type.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        file: UploadFile,
        options: UploadOptions,
    ) -> Result<T, Error> {
        let url = self.build_url(endpoint, &RequestOptions::default())?;
        debug!("{} {} (multipart)", options.method, url);

        let mut form = Form::new();
        for (name, value) in options.fields {
            let part = match value {
                FormValue::Text(text) => Part::text(text),
                FormValue::File(file) => file_part(file)?,
            };
            form = form.part(name, part);
        }
        form = form.part(options.field_name, file_part(file)?);

        let mut headers = self.default_headers(false);
        extend_headers(&mut headers, options.headers);
        headers.remove(CONTENT_TYPE);

        let response = self
            .http
            .request(options.method, url)
            .headers(headers)
            .multipart(form)
            .send()
            .await?;

        self.handle_response(response).await
    }

    // ── Pipeline ─────────────────────────────────────────────────────

    async fn send_json<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint, options)?;
        debug!("{} {}", method, url);

        let mut headers = self.default_headers(true);
        extend_headers(&mut headers, options.headers.clone());

        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(Error::Encode)?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await?;
        self.handle_response(response).await
    }

    /// Resolve `endpoint` against the base URL and append the surviving params.
    ///
    /// Absolute endpoints (`http://` / `https://`) are used as-is.
    pub fn build_url(&self, endpoint: &str, options: &RequestOptions) -> Result<Url, Error> {
        let raw = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') || endpoint.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        };

        let mut url = Url::parse(&raw).map_err(|source| Error::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        let mut pairs = options.params.rendered().peekable();
        if pairs.peek().is_some() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, &value);
            }
        }
        Ok(url)
    }

    /// Authorization, locale and (for JSON verbs) content type.
    ///
    /// Read synchronously at build time: a concurrent 401 does not rewrite
    /// headers of requests already built.
    fn default_headers(&self, json: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = self.session.token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(reqwest::header::AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("Bearer token contains invalid header characters; sending unauthenticated"),
            }
        }
        if let Some(locale) = self.locale() {
            if let Ok(value) = HeaderValue::from_str(&locale) {
                headers.insert(ACCEPT_LANGUAGE, value);
            }
        }
        headers
    }

    /// Turn a response into a decoded value or exactly one `ApiError`.
    ///
    /// The status decides before the body is read: a 401 ends the session even
    /// when its body cannot be read, and an unreadable error body is `Empty`.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, Error> {
        let status = response.status();
        trace!(status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED {
            self.session
                .expire(self.environment.login_redirect().map(str::to_string));
        }

        let body = match response.text().await {
            Ok(text) => ResponseBody::parse(text),
            Err(e) if !status.is_success() => {
                debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                ResponseBody::Empty
            }
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() {
            let error = ApiError::new(status, body);
            debug!(status = status.as_u16(), message = %error.message, "API error");
            return Err(error.into());
        }

        body.decode()
    }
}

fn file_part(file: UploadFile) -> Result<Part, Error> {
    let part = Part::bytes(file.bytes).file_name(file.file_name);
    match file.content_type {
        Some(content_type) => part
            .mime_str(&content_type)
            .map_err(|e| Error::Upload(format!("invalid content type '{content_type}': {e}"))),
        None => Ok(part),
    }
}

fn extend_headers(headers: &mut HeaderMap, extra: HeaderMap) {
    let mut last = None;
    for (name, value) in extra {
        // `None` continues the previous name.
        if let Some(name) = name {
            headers.remove(&name);
            last = Some(name);
        }
        if let Some(name) = &last {
            headers.append(name.clone(), value);
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryTokenStore;
    use crate::upstream::UpstreamTarget;
    use reqwest::header::AUTHORIZATION;

    fn client() -> ApiClient {
        let environment = Environment::Server(crate::client::environment::ServerEnvironment {
            upstream: UpstreamTarget::parse("https://api.example.com/api/v1").unwrap(),
        });
        let session = Arc::new(Session::new(Arc::new(MemoryTokenStore::new())));
        ApiClient::with_client(reqwest::Client::new(), environment, session)
    }

    #[test]
    fn test_build_url_relative_and_absolute() {
        let client = client();
        let options = RequestOptions::new();

        assert_eq!(
            client.build_url("/sectors", &options).unwrap().as_str(),
            "https://api.example.com/api/v1/sectors"
        );
        assert_eq!(
            client.build_url("sectors", &options).unwrap().as_str(),
            "https://api.example.com/api/v1/sectors"
        );
        assert_eq!(
            client.build_url("https://cdn.example.com/x", &options).unwrap().as_str(),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_build_url_omits_undefined_params() {
        let client = client();
        let options = RequestOptions::new()
            .param("a", 1)
            .param("b", None::<i32>)
            .param("c", "");

        let url = client.build_url("/items", &options).unwrap();
        assert_eq!(url.query(), Some("a=1"));

        let none = RequestOptions::new().param("b", None::<&str>);
        assert_eq!(client.build_url("/items", &none).unwrap().query(), None);
    }

    #[test]
    fn test_default_headers() {
        let client = client();
        let headers = client.default_headers(true);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());

        client.set_token(Some("abc".into()));
        client.set_locale(Some("fr".into()));
        let headers = client.default_headers(false);
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "fr");
    }

    #[test]
    fn test_extend_headers_overrides() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut extra = HeaderMap::new();
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        extra.insert("x-trace", HeaderValue::from_static("1"));

        extend_headers(&mut headers, extra);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-trace").unwrap(), "1");
    }
}
