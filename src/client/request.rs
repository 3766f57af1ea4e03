//! Request-side types: query parameters, per-call options, uploads.

use std::path::Path;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;

/// A primitive query parameter value.
///
/// `Undefined` and empty strings are omitted from the query string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Undefined,
}

impl ParamValue {
    /// Rendered value, or `None` when the parameter must be omitted.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Str(s) if s.is_empty() => None,
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::UInt(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Undefined => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

macro_rules! impl_param_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for ParamValue {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

impl_param_from!(Int as i64: i8, i16, i32, i64);
impl_param_from!(UInt as u64: u8, u16, u32, u64);
impl_param_from!(Float as f64: f32, f64);

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, ParamValue)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs that survive omission, in insertion order.
    pub fn rendered(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.0
            .iter()
            .filter_map(|(key, value)| value.render().map(|v| (key.as_str(), v)))
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Per-call options: query parameters and extra headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: QueryParams,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push(key, value);
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A file to send in a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, naming the part after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// An auxiliary multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(UploadFile),
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<UploadFile> for FormValue {
    fn from(value: UploadFile) -> Self {
        Self::File(value)
    }
}

/// Default multipart field name of the primary file.
pub const DEFAULT_FILE_FIELD: &str = "file";

/// Options for [`ApiClient::upload`](crate::client::ApiClient::upload).
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub field_name: String,
    pub fields: Vec<(String, FormValue)>,
    pub method: Method,
    pub headers: HeaderMap,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            field_name: DEFAULT_FILE_FIELD.to_string(),
            fields: Vec::new(),
            method: Method::POST,
            headers: HeaderMap::new(),
        }
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}
