//! # EVA Files
//!
//! EVA is the binary analysis format read by the downstream fitting
//! software. All numbers are little-endian.
//!
//! ```text
//! offset 0   i32   header length (bytes of header text)
//! offset 4   i32   start of the cycle records
//! offset 8   text  [Mass] [Switch] [Excit] [MCA] [SCAN0] [SCAN1] + terminator
//!            i32   number of frequency steps
//!            f64   one per frequency
//!            i32   1
//!            f64   0.0
//! records    per cycle:
//!            i16   declared length (timestamp + payload)
//!            i32   cycle start time (epoch seconds, truncated)
//!            payload, dense or sparse
//! ```
//!
//! | Layout | Chosen when | Declared length | Payload |
//! |--------|-------------|-----------------|---------|
//! | Dense  | empty channels < channels / 2 | `channels * 2 + 4` | i16 counts |
//! | Sparse | otherwise | `occupancy * 4 + 4` | (i16 channel, i16 count) pairs |

mod error;
mod format;
mod header;
mod layout;
mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub use error::EvaError;
pub use format::header_float;
pub use header::{render_header, EvaHeader, HeaderSection, HEADER_SECTIONS, HEADER_TERMINATOR};
pub use layout::{RecordLayout, RECORD_OVERHEAD};
pub use reader::{EvaFile, EvaRecord};
pub use writer::{
    EvaArtifact, EvaConfig, EvaSerializer, EvaWriteStats, FREQUENCY_SENTINEL_COUNT,
    FREQUENCY_SENTINEL_VALUE,
};
