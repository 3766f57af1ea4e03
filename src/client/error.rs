use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::client::storage::StorageError;

/// Message used when neither the body nor the status provides one.
pub const GENERIC_ERROR_MESSAGE: &str = "Request failed";

/// A response body, read fully as text and then classified.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    /// Not JSON (HTML error page, plain text, ...); kept verbatim.
    Text(String),
}

impl ResponseBody {
    pub fn parse(text: String) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }

    /// The `message` field of a JSON object body.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    /// The raw text of a non-JSON body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The body as a JSON value: empty is `null`, text is a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = self.into_value();
        serde_json::from_value(value.clone()).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: value,
        })
    }
}

/// A non-2xx response from the API.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("API error {status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ResponseBody,
    pub message: String,
}

impl ApiError {
    /// Derive the message: body `message`, then status text, then a generic fallback.
    pub fn new(status: StatusCode, body: ResponseBody) -> Self {
        let message = body
            .message()
            .map(str::to_string)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
        Self {
            status,
            body,
            message,
        }
    }
}

/// Top-level error type for the API client.
#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a response (DNS, connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body did not match the expected type.
    #[error("failed to decode response: {message}")]
    Decode { message: String, body: Value },

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid upload: {0}")]
    Upload(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Error {
    /// The API error, when the failure came from a non-2xx response.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.api().map(|e| e.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_from_json_body() {
        let body = ResponseBody::parse(r#"{"message":"Sector already exists","code":"DUP"}"#.into());
        let err = ApiError::new(StatusCode::CONFLICT, body);
        assert_eq!(err.message, "Sector already exists");
    }

    #[test]
    fn test_message_falls_back_to_status_text() {
        let err = ApiError::new(
            StatusCode::BAD_GATEWAY,
            ResponseBody::parse("<html>upstream down</html>".into()),
        );
        assert_eq!(err.message, "Bad Gateway");
        assert_eq!(err.body.as_text(), Some("<html>upstream down</html>"));

        let err = ApiError::new(StatusCode::NOT_FOUND, ResponseBody::parse(r#"{"message":""}"#.into()));
        assert_eq!(err.message, "Not Found");
    }

    #[test]
    fn test_message_generic_fallback() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = ApiError::new(status, ResponseBody::Empty);
        assert_eq!(err.message, GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_body_classification() {
        assert_eq!(ResponseBody::parse(String::new()), ResponseBody::Empty);
        assert_eq!(ResponseBody::parse("[1,2]".into()), ResponseBody::Json(json!([1, 2])));
        assert_eq!(ResponseBody::parse("OK".into()), ResponseBody::Text("OK".into()));
    }

    #[test]
    fn test_decode_empty_and_text() {
        let unit: Option<u32> = ResponseBody::Empty.decode().unwrap();
        assert_eq!(unit, None);

        let text: String = ResponseBody::Text("pong".into()).decode().unwrap();
        assert_eq!(text, "pong");

        let err = ResponseBody::Json(json!({"id": "1"})).decode::<Vec<String>>().unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
