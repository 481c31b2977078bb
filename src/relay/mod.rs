//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! server.rs accept loop
//!     → guard::ConnectionGatekeeper (admit / close)
//!     → upstream.rs (connect to protected server, copy both ways
//!       through guard::MeteredStream)
//!
//! config watcher channel → server.rs → FilterConfiguration::replace
//! ```

pub mod server;
pub mod upstream;

pub use server::{GuardServer, ServerError};
pub use upstream::Upstream;
