//! Address ranges and the set the gatekeeper matches against.
//!
//! # Responsibilities
//! - Represent an inclusive `[lower, upper]` block of addresses
//! - Answer "is this address covered?" for a set of blocks
//!
//! # Design Decisions
//! - Addresses compare numerically within a family; IPv4 and IPv6 never match
//!   each other; callers pass canonical peer addresses
//! - Linear scan: configured sets are tens of entries, not thousands
//! - Empty set = no restriction

use std::net::IpAddr;

use super::RangeError;

/// An inclusive block of addresses of a single family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    lower: IpAddr,
    upper: IpAddr,
}

impl IpRange {
    /// Create a range from inclusive bounds.
    ///
    /// Both bounds must belong to the same family and `lower <= upper`.
    pub fn new(lower: IpAddr, upper: IpAddr) -> Result<Self, RangeError> {
        match (lower, upper) {
            (IpAddr::V4(lo), IpAddr::V4(hi)) if lo > hi => Err(RangeError::Inverted { lower, upper }),
            (IpAddr::V6(lo), IpAddr::V6(hi)) if lo > hi => Err(RangeError::Inverted { lower, upper }),
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => Ok(Self { lower, upper }),
            _ => Err(RangeError::FamilyMismatch { lower, upper }),
        }
    }

    /// A range covering exactly one address.
    pub fn single(addr: IpAddr) -> Self {
        Self {
            lower: addr,
            upper: addr,
        }
    }

    pub fn lower(&self) -> IpAddr {
        self.lower
    }

    pub fn upper(&self) -> IpAddr {
        self.upper
    }

    /// Returns true if `addr` is of this range's family and within its bounds.
    #[inline]
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self.lower, self.upper, addr) {
            (IpAddr::V4(lo), IpAddr::V4(hi), IpAddr::V4(a)) => lo <= *a && *a <= hi,
            (IpAddr::V6(lo), IpAddr::V6(hi), IpAddr::V6(a)) => lo <= *a && *a <= hi,
            _ => false,
        }
    }
}

impl std::fmt::Display for IpRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.lower == self.upper {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "{}-{}", self.lower, self.upper)
        }
    }
}

/// The union of all configured ranges.
///
/// Built append-only, then shared behind an `Arc` and never touched again.
/// Reconfiguration produces a new set (see [`FilterConfiguration`]).
///
/// [`FilterConfiguration`]: super::FilterConfiguration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<IpRange>,
}

impl RangeSet {
    /// Create an empty (unrestricted) set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a range. Only valid before the set is published.
    pub fn push(&mut self, range: IpRange) {
        self.ranges.push(range);
    }

    /// Returns true if no ranges are configured.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IpRange> {
        self.ranges.iter()
    }

    /// Returns true if the set is empty or any range covers `addr`.
    pub fn accepts(&self, addr: &IpAddr) -> bool {
        self.ranges.is_empty() || self.ranges.iter().any(|r| r.contains(addr))
    }
}

impl FromIterator<IpRange> for RangeSet {
    fn from_iter<T: IntoIterator<Item = IpRange>>(iter: T) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a IpRange;
    type IntoIter = std::slice::Iter<'a, IpRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
