use std::collections::BTreeMap;

/// Sparse TOF histogram of one validated acquisition cycle.
///
/// Only occupied channels are stored; every stored count is at least 1.
/// Channels iterate in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleHistogram {
    cycle_index: usize,
    bins: BTreeMap<u16, u32>,
}

impl CycleHistogram {
    /// Build a histogram from an accumulated channel map
    pub fn new(cycle_index: usize, bins: BTreeMap<u16, u32>) -> Self {
        let bins = bins.into_iter().filter(|&(_, count)| count > 0).collect();
        Self { cycle_index, bins }
    }

    /// Build a histogram by counting a list of channel hits
    pub fn from_hits(cycle_index: usize, hits: impl IntoIterator<Item = u16>) -> Self {
        let mut bins = BTreeMap::new();
        for channel in hits {
            *bins.entry(channel).or_insert(0u32) += 1;
        }
        Self { cycle_index, bins }
    }

    /// Completed cycle number (0-based)
    pub fn cycle_index(&self) -> usize {
        self.cycle_index
    }

    /// Number of distinct non-empty channels
    pub fn occupancy(&self) -> usize {
        self.bins.len()
    }

    /// Total number of hits in the cycle
    pub fn total_hits(&self) -> u64 {
        self.bins.values().map(|&c| u64::from(c)).sum()
    }

    /// Hit count of a channel (0 if empty)
    pub fn count(&self, channel: u16) -> u32 {
        self.bins.get(&channel).copied().unwrap_or(0)
    }

    /// Iterate over `(channel, count)` in ascending channel order
    pub fn iter(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.bins.iter().map(|(&channel, &count)| (channel, count))
    }

    /// Highest occupied channel
    pub fn max_channel(&self) -> Option<u16> {
        self.bins.keys().next_back().copied()
    }
}
