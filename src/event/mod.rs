//! # MPET Event Decoding
//!
//! The MPET TDC writes every hit as a pair of 32-bit words. The dump tool
//! renders each word as a `0x`-prefixed, 8-digit hex token:
//!
//! ```text
//!  first word                     second word
//!  0 x T C C C . . . .            0 x S S S S S S S S
//!      │ └┬┘                          └──────┬───────┘
//!      │  └ gate counter (< 1024)            └ TOF in 10 ns ticks
//!      └ event type
//! ```
//!
//! | type | alias | meaning |
//! |------|-------|---------|
//! | `8`  | `a`   | TDC gate open |
//! | `1`  | `3`   | TDC gate close |
//! | `4`  | `6`   | ion outside the gate |
//! | `2`  |       | ion inside the gate |
//! | `0`  |       | timestamp |
//!
//! Alias codes are a known firmware glitch. They decode to the canonical
//! type, but the raw first word is kept in an anomaly list so it can be
//! echoed next to the converted file.

mod decoder;
mod error;


pub use decoder::{EventDecoder, Position, RawWordPair};
pub use error::DecodeError;

/// Width of a raw hex token, including the `0x` prefix
pub const TOKEN_WIDTH: usize = 10;

/// Microseconds per raw TOF tick
pub const TOF_TICK_US: f64 = 0.01;

/// Gate counters are 10-bit and wrap at this value
pub const GATE_COUNTER_LIMIT: u16 = 1024;

/// Canonical event type, as encoded by the type nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `8` (alias `a`)
    GateOpen,
    /// `1` (alias `3`)
    GateClose,
    /// `4` (alias `6`)
    OutOfGateIon,
    /// `2`
    InGateIon,
    /// `0`
    Timestamp,
}

impl EventKind {
    /// Map a type nibble to its event kind.
    ///
    /// Returns the kind and whether the nibble was a glitch alias, or `None`
    /// for nibbles the TDC never produces.
    pub fn from_nibble(nibble: char) -> Option<(Self, bool)> {
        match nibble.to_ascii_lowercase() {
            '8' => Some((EventKind::GateOpen, false)),
            'a' => Some((EventKind::GateOpen, true)),
            '1' => Some((EventKind::GateClose, false)),
            '3' => Some((EventKind::GateClose, true)),
            '4' => Some((EventKind::OutOfGateIon, false)),
            '6' => Some((EventKind::OutOfGateIon, true)),
            '2' => Some((EventKind::InGateIon, false)),
            '0' => Some((EventKind::Timestamp, false)),
            _ => None,
        }
    }
}

/// A decoded TDC event.
///
/// `cycle` is the hardware gate counter, `tof_us` the time of flight in
/// microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Start of a TDC gate
    GateOpen {
        /// Gate counter
        cycle: u16,
    },
    /// End of a TDC gate
    GateClose {
        /// Gate counter
        cycle: u16,
    },
    /// Ion detected while the gate was closed
    OutOfGateIon {
        /// Gate counter
        cycle: u16,
        /// Time of flight (µs)
        tof_us: f64,
    },
    /// Ion detected inside the gate
    InGateIon {
        /// Gate counter
        cycle: u16,
        /// Time of flight (µs)
        tof_us: f64,
    },
    /// Timestamp word
    Timestamp {
        /// Gate counter
        cycle: u16,
        /// Time of flight (µs)
        tof_us: f64,
    },
}

impl Event {
    /// Build an event from its decoded fields
    pub fn new(kind: EventKind, cycle: u16, tof_us: f64) -> Self {
        match kind {
            EventKind::GateOpen => Event::GateOpen { cycle },
            EventKind::GateClose => Event::GateClose { cycle },
            EventKind::OutOfGateIon => Event::OutOfGateIon { cycle, tof_us },
            EventKind::InGateIon => Event::InGateIon { cycle, tof_us },
            EventKind::Timestamp => Event::Timestamp { cycle, tof_us },
        }
    }

    /// Event kind
    pub fn kind(&self) -> EventKind {
        match self {
            Event::GateOpen { .. } => EventKind::GateOpen,
            Event::GateClose { .. } => EventKind::GateClose,
            Event::OutOfGateIon { .. } => EventKind::OutOfGateIon,
            Event::InGateIon { .. } => EventKind::InGateIon,
            Event::Timestamp { .. } => EventKind::Timestamp,
        }
    }

    /// Hardware gate counter carried by the event
    pub fn cycle(&self) -> u16 {
        match *self {
            Event::GateOpen { cycle }
            | Event::GateClose { cycle }
            | Event::OutOfGateIon { cycle, .. }
            | Event::InGateIon { cycle, .. }
            | Event::Timestamp { cycle, .. } => cycle,
        }
    }

    /// Time of flight for events that get binned
    pub fn tof_us(&self) -> Option<f64> {
        match *self {
            Event::OutOfGateIon { tof_us, .. }
            | Event::InGateIon { tof_us, .. }
            | Event::Timestamp { tof_us, .. } => Some(tof_us),
            Event::GateOpen { .. } | Event::GateClose { .. } => None,
        }
    }
}

/// An event plus whether its type nibble was a glitch alias
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedEvent {
    /// The canonical event
    pub event: Event,
    /// True when the raw type nibble was `a`, `6` or `3`
    pub anomalous: bool,
}

/// Output of [`EventDecoder::decode`]
#[derive(Debug, Clone, Default)]
pub struct DecodedEvents {
    /// Events in input order, one per word pair
    pub events: Vec<DecodedEvent>,
    /// Raw first words whose type nibble was an alias, in input order
    pub anomalies: Vec<String>,
}

impl DecodedEvents {
    /// Iterate over the canonical events
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().map(|decoded| &decoded.event)
    }

    /// Number of decoded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events were decoded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
