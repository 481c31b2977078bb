//! Connection guard subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP socket
//!     → gatekeeper.rs (admit / reject against the active RangeSet)
//!         rejected → socket closed, blocked counter +1
//!         admitted → accepted counter +1
//!     → stream.rs (MeteredStream around the socket)
//!         every read  → interceptor.rs on_inbound
//!         every write → interceptor.rs on_outbound
//!             → TelemetryCounters + per-connection AccountingSink
//!     → downstream stage (upstream relay)
//! ```
//!
//! # Design Decisions
//! - Gatekeeper and interceptor are shared, reentrant, and lock-free
//! - Nothing here awaits; every hook runs in bounded time on the hot path
//! - Per-connection state lives in accounting.rs, owned by the connection

pub mod accounting;
pub mod gatekeeper;
pub mod interceptor;
pub mod stream;

pub use accounting::{AccountingSink, ConnectionAccounting};
pub use gatekeeper::{Admission, ConnectionGatekeeper};
pub use interceptor::{Chunk, TrafficInterceptor};
pub use stream::MeteredStream;
