use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::{BinningConfig, CycleError, CycleHistogram, GateFault};
use crate::event::Event;

/// Gate tracking state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    /// Between cycles; ion events are pre-gate noise
    #[default]
    AwaitingGate,
    /// Inside a TDC gate
    InGate {
        /// Counter carried by the gate open event
        open_counter: u16,
        /// Hits per channel so far
        accumulator: BTreeMap<u16, u32>,
    },
}

/// State threaded through [`CycleProcessor::step`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleState {
    gate: GateState,
    next_cycle: usize,
    dropped_samples: usize,
    pre_gate_events: usize,
}

impl CycleState {
    /// Fresh state: awaiting the first gate, cycle index 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gate state
    pub fn gate(&self) -> &GateState {
        &self.gate
    }

    /// Index the next completed cycle will get
    pub fn next_cycle_index(&self) -> usize {
        self.next_cycle
    }

    /// In-gate samples dropped for being at or above the TOF limit
    pub fn dropped_samples(&self) -> usize {
        self.dropped_samples
    }

    /// Ion and timestamp events seen outside any gate
    pub fn pre_gate_events(&self) -> usize {
        self.pre_gate_events
    }
}

/// Result of processing a complete event sequence
#[derive(Debug, Clone, Default)]
pub struct CycleOutcome {
    /// One histogram per validated cycle, in cycle order
    pub histograms: Vec<CycleHistogram>,
    /// In-gate samples dropped for being at or above the TOF limit
    pub dropped_samples: usize,
    /// Ion and timestamp events seen outside any gate
    pub pre_gate_events: usize,
    /// True if the sequence ended inside an unterminated gate
    pub discarded_trailing_cycle: bool,
}

/// Single-pass gate integrity checker and TOF binner
#[derive(Debug, Clone, Default)]
pub struct CycleProcessor {
    config: BinningConfig,
}

impl CycleProcessor {
    /// Create a processor with the given binning
    pub fn new(config: BinningConfig) -> Self {
        Self { config }
    }

    /// Binning in use
    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    /// Consume the whole event sequence.
    ///
    /// The first integrity violation aborts processing and no histograms are
    /// returned. A trailing cycle without a gate close is discarded.
    pub fn process<'a, I>(&self, events: I) -> Result<CycleOutcome, CycleError>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut state = CycleState::new();
        let mut histograms = Vec::new();

        for event in events {
            let (next, completed) = self.step(state, event)?;
            state = next;
            if let Some(histogram) = completed {
                histograms.push(histogram);
            }
        }

        let discarded_trailing_cycle = matches!(state.gate, GateState::InGate { .. });
        if discarded_trailing_cycle {
            warn!(
                "Event stream ended inside the gate of cycle {}; the unterminated cycle is discarded",
                state.next_cycle
            );
        }
        if state.dropped_samples > 0 {
            debug!(
                "Dropped {} samples at or above {} us",
                state.dropped_samples,
                self.config.max_tof_us()
            );
        }
        info!("Validated {} cycles", histograms.len());

        Ok(CycleOutcome {
            histograms,
            dropped_samples: state.dropped_samples,
            pre_gate_events: state.pre_gate_events,
            discarded_trailing_cycle,
        })
    }

    /// Advance the state machine by one event.
    ///
    /// Returns the new state and, on a validated gate close, the completed
    /// cycle's histogram.
    pub fn step(
        &self,
        mut state: CycleState,
        event: &Event,
    ) -> Result<(CycleState, Option<CycleHistogram>), CycleError> {
        let gate = std::mem::take(&mut state.gate);

        match (*event, gate) {
            (Event::GateOpen { cycle }, GateState::AwaitingGate) => {
                state.gate = GateState::InGate {
                    open_counter: cycle,
                    accumulator: BTreeMap::new(),
                };
            }
            (Event::GateOpen { cycle }, GateState::InGate { open_counter, accumulator }) => {
                // A repeated open re-arms the gate; the close check catches a lost close.
                debug!(
                    "Gate open {} while gate {} is open at cycle {}",
                    cycle, open_counter, state.next_cycle
                );
                state.gate = GateState::InGate {
                    open_counter: cycle,
                    accumulator,
                };
            }
            (Event::GateClose { cycle }, GateState::InGate { open_counter, accumulator }) => {
                let histogram = self.close_gate(&mut state, open_counter, cycle, accumulator)?;
                return Ok((state, Some(histogram)));
            }
            (Event::GateClose { cycle }, GateState::AwaitingGate) => {
                debug!("Gate close {} without a preceding gate open", cycle);
                return Err(CycleError::GateMismatch {
                    fault: GateFault::MissingGateOpen,
                    cycle_index: state.next_cycle,
                });
            }
            (Event::OutOfGateIon { .. }, gate) => {
                state.gate = gate;
            }
            (
                Event::InGateIon { tof_us, .. } | Event::Timestamp { tof_us, .. },
                GateState::InGate {
                    open_counter,
                    mut accumulator,
                },
            ) => {
                match self.config.channel_for(tof_us) {
                    Some(channel) => *accumulator.entry(channel).or_insert(0) += 1,
                    None => state.dropped_samples += 1,
                }
                state.gate = GateState::InGate {
                    open_counter,
                    accumulator,
                };
            }
            (Event::InGateIon { .. } | Event::Timestamp { .. }, GateState::AwaitingGate) => {
                state.pre_gate_events += 1;
            }
        }

        Ok((state, None))
    }

    fn close_gate(
        &self,
        state: &mut CycleState,
        open_counter: u16,
        close_counter: u16,
        accumulator: BTreeMap<u16, u32>,
    ) -> Result<CycleHistogram, CycleError> {
        let cycle_index = state.next_cycle;

        if open_counter != close_counter {
            let fault = if open_counter < close_counter {
                GateFault::MissingGateOpen
            } else {
                GateFault::MissingGateClose
            };
            warn!(
                "Gate counters out of sync at cycle {}: open {}, close {}",
                cycle_index, open_counter, close_counter
            );
            return Err(CycleError::GateMismatch { fault, cycle_index });
        }

        let expected = self.config.expected_gate_counter(cycle_index);
        if usize::from(open_counter) != expected {
            warn!(
                "Gate counter {} at cycle {}, expected {}: an acquisition cycle is missing",
                open_counter, cycle_index, expected
            );
            return Err(CycleError::MissingEvent { cycle_index });
        }

        state.next_cycle += 1;
        Ok(CycleHistogram::new(cycle_index, accumulator))
    }
}
