//! # midas2eva - MIDAS to EVA Converter
//!
//! `midas2eva` turns the time-of-flight event banks recorded by the MPET
//! Penning trap data acquisition into EVA files, the binary format read by
//! the downstream fitting software.
//!
//! ## Key Features
//!
//! - **Integrity first**: every gate open/close pair and every gate counter
//!   is checked. A missing or reordered cycle aborts the conversion before
//!   any file is written.
//!
//! - **Bit-compatible output**: header text, float formatting and the
//!   dense/sparse record choice match the files existing analysis code
//!   already reads.
//!
//! - **ODB metadata**: run parameters are read from the begin- and end-of-run
//!   ODB dumps embedded in the `.mid` file, and any of them can be
//!   overridden.
//!
//! - **Atomic artifacts**: each output file is staged and renamed into place,
//!   so a failed write never leaves a partial file behind.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use midas2eva::converter::MidasConverter;
//! use midas2eva::mdump::MdumpCapture;
//!
//! let capture = MdumpCapture::default().run("run00042.mid")?;
//! let outcome = MidasConverter::new().convert("run00042.mid", &capture)?;
//!
//! println!("{}", outcome.stats);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! This writes next to the run file:
//! ```text
//! run00042_eva.dat    # EVA file
//! run00042_dump.dat   # raw event words, one per line
//! run00042_pos.dat    # MCP positions, when the run recorded any
//! run00042_err.dat    # words with an aliased type nibble, if any
//! ```
//!
//! ## Architecture
//!
//! - [`mdump`]: runs the `mdump` tool and extracts bank words from its output
//! - [`event`]: decodes word pairs into typed events
//! - [`cycle`]: gate integrity checks and per-cycle TOF histograms
//! - [`metadata`]: run file, ODB dumps and resolved run parameters
//! - [`frequency`]: excitation frequency table
//! - [`eva`]: EVA serialization and read-back
//! - [`output`]: artifact naming and atomic publication
//! - [`converter`]: the end-to-end pipeline
//! - [`validator`]: EVA file integrity checks

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod converter;
pub mod cycle;
pub mod eva;
pub mod event;
pub mod frequency;
pub mod mdump;
pub mod metadata;
pub mod output;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::converter::{
        ConversionConfig, ConversionError, ConversionOutcome, ConversionStats, MidasConverter,
    };
    pub use crate::cycle::{BinningConfig, CycleError, CycleHistogram, CycleProcessor};
    pub use crate::eva::{EvaConfig, EvaFile, EvaSerializer, RecordLayout};
    pub use crate::event::{DecodedEvents, Event, EventDecoder, EventKind};
    pub use crate::frequency::{FrequencyListBuilder, FrequencyListPolicy};
    pub use crate::mdump::{CaptureBanks, MdumpCapture};
    pub use crate::metadata::{ExperimentMetadata, MetadataOverrides, RunFile};
    pub use crate::output::{ArtifactKind, OutputDirs};
    pub use crate::validator::{validate_eva_file, ValidationReport};
}
