use super::BinningError;
use crate::event::GATE_COUNTER_LIMIT;

/// Hardware gate counters wrap at this value
pub const GATE_COUNTER_MODULUS: usize = GATE_COUNTER_LIMIT as usize;

/// Largest channel count whose dense record length still fits in an `i16`
pub const MAX_CHANNELS: usize = (i16::MAX as usize - 4) / 2;

/// Default TOF bin width (µs)
pub const DEFAULT_BIN_WIDTH_US: f64 = 0.1;

/// Default upper TOF limit (µs); samples at or above it are dropped
pub const DEFAULT_MAX_TOF_US: f64 = 100.0;

/// TOF histogram and gate-counter settings
#[derive(Debug, Clone, PartialEq)]
pub struct BinningConfig {
    bin_width_us: f64,
    max_tof_us: f64,
    num_channels: usize,
    first_gate_counter: u16,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            bin_width_us: DEFAULT_BIN_WIDTH_US,
            max_tof_us: DEFAULT_MAX_TOF_US,
            num_channels: 1000,
            first_gate_counter: 0,
        }
    }
}

impl BinningConfig {
    /// Create a binning configuration.
    ///
    /// The channel count is `max_tof / bin_width`, truncated.
    pub fn new(bin_width_us: f64, max_tof_us: f64) -> Result<Self, BinningError> {
        for (name, value) in [("bin_width_us", bin_width_us), ("max_tof_us", max_tof_us)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BinningError::InvalidParameter { name, value });
            }
        }

        let num_channels = (max_tof_us / bin_width_us) as usize;
        if num_channels == 0 {
            return Err(BinningError::InvalidParameter {
                name: "max_tof_us",
                value: max_tof_us,
            });
        }
        if num_channels > MAX_CHANNELS {
            return Err(BinningError::TooManyChannels(num_channels));
        }

        Ok(Self {
            bin_width_us,
            max_tof_us,
            num_channels,
            first_gate_counter: 0,
        })
    }

    /// Gate counter value the hardware assigns to cycle index 0
    pub fn with_first_gate_counter(mut self, counter: u16) -> Self {
        self.first_gate_counter = counter;
        self
    }

    /// Bin width (µs)
    pub fn bin_width_us(&self) -> f64 {
        self.bin_width_us
    }

    /// Upper TOF limit (µs)
    pub fn max_tof_us(&self) -> f64 {
        self.max_tof_us
    }

    /// Number of histogram channels
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Gate counter of cycle index 0
    pub fn first_gate_counter(&self) -> u16 {
        self.first_gate_counter
    }

    /// Gate counter expected for the given running cycle index
    pub fn expected_gate_counter(&self, cycle_index: usize) -> usize {
        (usize::from(self.first_gate_counter) + cycle_index) % GATE_COUNTER_MODULUS
    }

    /// Histogram channel for a TOF value, or `None` if it falls outside
    /// `[0, max_tof)`
    pub fn channel_for(&self, tof_us: f64) -> Option<u16> {
        if !(tof_us >= 0.0 && tof_us < self.max_tof_us) {
            return None;
        }
        let bin = (tof_us / self.bin_width_us).floor() as usize;
        if bin < self.num_channels {
            u16::try_from(bin).ok()
        } else {
            None
        }
    }
}
