//! Range notation parsing.
//!
//! Accepted forms:
//! - single address: `192.168.0.1`, `::1`
//! - CIDR block: `10.0.0.0/8`, `2001:db8::/32` (host bits are masked off)
//! - explicit span: `10.0.0.1-10.0.0.9`

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use super::{IpRange, RangeError, RangeSet};

/// Parse one range entry.
pub fn parse_range(input: &str) -> Result<IpRange, RangeError> {
    let entry = input.trim();
    if entry.is_empty() {
        return Err(RangeError::Notation(input.to_string()));
    }

    if let Some((addr, prefix)) = entry.split_once('/') {
        let addr = parse_addr(addr, input)?;
        let prefix: u8 = prefix
            .trim()
            .parse()
            .map_err(|_| RangeError::Notation(input.to_string()))?;
        return cidr(addr, prefix);
    }

    if let Some((lower, upper)) = entry.split_once('-') {
        return IpRange::new(parse_addr(lower, input)?, parse_addr(upper, input)?);
    }

    Ok(IpRange::single(parse_addr(entry, input)?))
}

/// Parse a list of entries into a set. Any invalid entry fails the whole set.
pub fn parse_range_set<I, S>(entries: I) -> Result<RangeSet, RangeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|e| parse_range(e.as_ref()))
        .collect()
}

impl FromStr for IpRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range(s)
    }
}

/// Comma-separated list, e.g. `"10.0.0.0/8, 192.168.1.1"`. Blank entries are skipped.
impl FromStr for RangeSet {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range_set(s.split(',').filter(|e| !e.trim().is_empty()))
    }
}

fn parse_addr(s: &str, input: &str) -> Result<IpAddr, RangeError> {
    s.trim()
        .parse()
        .map_err(|_| RangeError::Notation(input.to_string()))
}

fn cidr(addr: IpAddr, prefix: u8) -> Result<IpRange, RangeError> {
    match addr {
        IpAddr::V4(a) => {
            if prefix > 32 {
                return Err(RangeError::Prefix { prefix, max: 32 });
            }
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            let lower = u32::from(a) & mask;
            IpRange::new(
                IpAddr::V4(Ipv4Addr::from(lower)),
                IpAddr::V4(Ipv4Addr::from(lower | !mask)),
            )
        }
        IpAddr::V6(a) => {
            if prefix > 128 {
                return Err(RangeError::Prefix { prefix, max: 128 });
            }
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            let lower = u128::from(a) & mask;
            IpRange::new(
                IpAddr::V6(Ipv6Addr::from(lower)),
                IpAddr::V6(Ipv6Addr::from(lower | !mask)),
            )
        }
    }
}
