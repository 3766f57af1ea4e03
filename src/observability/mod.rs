//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarder and client produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout/stderr (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows from the browser through to the upstream API
//! - Metrics are cheap (atomic increments) and the exporter is opt-in

pub mod logging;
pub mod metrics;
