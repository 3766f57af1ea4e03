//! Typed API client.
//!
//! # Data Flow
//! ```text
//! caller (service / CLI)
//!     → api.rs (URL + query, auth/locale headers, JSON or multipart body)
//!     → forwarder (browser environment) or upstream (server environment)
//!     → api.rs (read text, classify body, 2xx → decode, else ApiError)
//!     → on 401: session.rs wipes slot + storage.rs, emits SessionEvent::Expired
//! ```
//!
//! # Design Decisions
//! - The session is an owned object injected into the client, not a global
//! - The environment is chosen once at construction (browser vs server)
//! - Single-shot calls: no retries, no coalescing, no cancellation

pub mod api;
pub mod environment;
pub mod error;
pub mod request;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use environment::{BrowserEnvironment, Environment, ServerEnvironment};
pub use error::{ApiError, Error, ResponseBody};
pub use request::{FormValue, ParamValue, QueryParams, RequestOptions, UploadFile, UploadOptions};
pub use session::{Session, SessionEvent};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
