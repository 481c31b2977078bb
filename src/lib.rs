//! Edge guard library: admission control and traffic telemetry in front of
//! an HTTP server.

pub mod config;
pub mod filter;
pub mod guard;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;
pub mod telemetry;

pub use config::GuardConfig;
pub use filter::{FilterConfiguration, IpRange, RangeSet};
pub use guard::{Admission, ConnectionGatekeeper, TrafficInterceptor};
pub use lifecycle::Shutdown;
pub use relay::GuardServer;
pub use telemetry::{TelemetryCounters, TelemetrySnapshot};
