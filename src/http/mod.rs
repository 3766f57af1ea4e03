//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request  /api/proxy/{*path}
//!     → server.rs (Axum setup, limits, timeout, request ID)
//!     → forward.rs (rebuild target URL, re-encode body)
//!     → request.rs (scrub transport headers, force Accept)
//!     → upstream API
//!     → response.rs (strip encoding/length headers, relay blob)
//!     → Send to browser
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardBody, ForwardError, JsonBody};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ProxyErrorBody;
pub use server::{AppState, HttpServer, ServerError};
