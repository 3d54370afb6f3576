//! # Cycle Integrity and TOF Binning
//!
//! A single pass over the decoded events tracks TDC gates. Each gate close
//! is checked against its gate open (the counters must match) and against
//! the running cycle index (the counter must equal the index modulo 1024),
//! so any dropped acquisition cycle is caught. Ions and timestamps inside a
//! gate are binned into that cycle's TOF histogram.
//!
//! ```text
//!              GateOpen{c}
//!  AwaitingGate ──────────▶ InGate(c, acc) ──┐ InGateIon / Timestamp: acc[bin] += 1
//!       ▲                        │     ▲     │
//!       │   GateClose{c} ok      │     └─────┘
//!       └────────────────────────┘ emit CycleHistogram(index, acc)
//! ```
//!
//! Downstream fits assume a contiguous cycle index, so the first violation
//! aborts the conversion.

mod config;
mod error;
mod histogram;
mod processor;

#[cfg(test)]
mod tests;

pub use config::{
    BinningConfig, DEFAULT_BIN_WIDTH_US, DEFAULT_MAX_TOF_US, GATE_COUNTER_MODULUS, MAX_CHANNELS,
};
pub use error::{BinningError, CycleError, GateFault};
pub use histogram::CycleHistogram;
pub use processor::{CycleOutcome, CycleProcessor, CycleState, GateState};
