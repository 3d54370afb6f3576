//! # Run Metadata
//!
//! A MIDAS run file (`.mid`) carries two dumps of the online database: one
//! written at begin of run and one at end of run. The EVA header is built
//! from scalar values in those dumps.
//!
//! | Field | Dump | Address |
//! |-------|------|---------|
//! | mass, charge, amplitude | begin | `Variables` (depth 2) |
//! | start/stop frequency | end | `Variables` (depth 2), MHz |
//! | frequency steps, cycles | end | `begin_ramp`/`begin_scan` (depth 4) |
//! | start/stop time | begin/end | `Runinfo` (depth 1) |
//! | TDC gate, RF time | begin | sequencer transitions (depth 4), ms |
//!
//! Every field can be overridden through [`MetadataOverrides`], in which
//! case the ODB address is never consulted.

mod error;
mod experiment;
mod odb;
mod run_file;


pub use error::MetadataError;
pub use experiment::{ExperimentMetadata, MetadataOverrides};
pub use odb::{OdbAddress, OdbDir, OdbKey, OdbTree};
pub use run_file::RunFile;
