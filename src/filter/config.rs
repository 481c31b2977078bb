//! Process-wide holder of the active range set.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::RangeSet;

/// Holds exactly one [`RangeSet`] at a time.
///
/// Readers take a single atomic load; reconfiguration swaps the whole
/// reference. A reader sees either the old or the new set, never a mix.
#[derive(Debug)]
pub struct FilterConfiguration {
    current: ArcSwap<RangeSet>,
}

impl FilterConfiguration {
    pub fn new(ranges: RangeSet) -> Self {
        Self {
            current: ArcSwap::from_pointee(ranges),
        }
    }

    /// The currently active set.
    #[inline]
    pub fn current(&self) -> Arc<RangeSet> {
        self.current.load_full()
    }

    /// Atomically replace the active set, returning the previous one.
    pub fn replace(&self, ranges: RangeSet) -> Arc<RangeSet> {
        let len = ranges.len();
        let previous = self.current.swap(Arc::new(ranges));
        tracing::info!(
            ranges = len,
            previous_ranges = previous.len(),
            "IP filter replaced"
        );
        previous
    }
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self::new(RangeSet::new())
    }
}
