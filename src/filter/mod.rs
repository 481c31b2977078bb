//! Address filter subsystem.
//!
//! # Data Flow
//! ```text
//! config file `filter.ranges`
//!     → parse.rs (CIDR / span / single notation → IpRange)
//!     → range_set.rs (RangeSet, immutable once built)
//!     → config.rs (FilterConfiguration, ArcSwap<RangeSet>)
//!     → read by the gatekeeper on every connection attempt
//!
//! On reload:
//!     new RangeSet built off to the side
//!     → FilterConfiguration::replace (single pointer swap)
//! ```

pub mod config;
pub mod parse;
pub mod range_set;

use std::net::IpAddr;

pub use config::FilterConfiguration;
pub use parse::{parse_range, parse_range_set};
pub use range_set::{IpRange, RangeSet};

/// Errors building ranges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range bounds belong to different address families: {lower} - {upper}")]
    FamilyMismatch { lower: IpAddr, upper: IpAddr },

    #[error("range lower bound {lower} is above upper bound {upper}")]
    Inverted { lower: IpAddr, upper: IpAddr },

    #[error("prefix length /{prefix} exceeds /{max}")]
    Prefix { prefix: u8, max: u8 },

    #[error("invalid range notation: {0:?}")]
    Notation(String),
}
