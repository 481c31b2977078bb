//! Telemetry subsystem.
//!
//! # Data Flow
//! ```text
//! gatekeeper (accepted / blocked)
//! interceptor (bytes + messages, both directions)
//!     → counters.rs (atomic, clamp-on-overflow)
//!     → snapshot() polled by reporter.rs
//!     → observability::metrics (Prometheus gauges)
//! ```

pub mod counters;
pub mod reporter;

pub use counters::{Counter, TelemetryCounters, TelemetrySnapshot};
pub use reporter::run_reporter;
