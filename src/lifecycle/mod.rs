//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger_on_os_signal
//!
//! Shutdown (shutdown.rs):
//!     trigger → ShutdownSignal::wait resolves → server stops accepting
//!     → in-flight requests drain → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
