use std::fmt;

/// Which gate boundary is missing when open and close counters disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFault {
    /// The close counter is ahead of the open counter
    MissingGateOpen,
    /// The open counter is ahead of the close counter
    MissingGateClose,
}

impl fmt::Display for GateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFault::MissingGateOpen => write!(f, "missing TDC gate open event"),
            GateFault::MissingGateClose => write!(f, "missing TDC gate close event"),
        }
    }
}

/// Cycle integrity violations. Any of these aborts the whole conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    /// Gate open and close counters disagree
    #[error("Gate counters out of sync: {fault} at cycle number {cycle_index}")]
    GateMismatch {
        /// Which boundary is missing
        fault: GateFault,
        /// Running cycle index when the mismatch was found
        cycle_index: usize,
    },

    /// The gate counter skipped, so an acquisition cycle was dropped
    #[error("Possible missing event near cycle number {cycle_index}")]
    MissingEvent {
        /// Cycle index that was expected next
        cycle_index: usize,
    },
}

/// Invalid binning parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BinningError {
    /// Bin width or max TOF is not a positive finite number
    #[error("Invalid binning parameter {name} = {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// The channel count does not fit the 2-byte EVA record length
    #[error("{0} channels exceed the EVA record length limit")]
    TooManyChannels(usize),
}
