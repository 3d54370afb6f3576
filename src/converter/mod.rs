//! # Conversion Pipeline
//!
//! ```text
//! run.mid ──► RunFile ──► ExperimentMetadata ─────────────┐
//!                                                         ▼
//! capture ──► banks ──► EventDecoder ──► CycleProcessor ──► EvaSerializer
//!                                                         ▲
//!                         FrequencyListBuilder ───────────┘
//! ```
//!
//! Every stage up to serialization runs in memory. The first error in any of
//! them aborts the conversion with nothing written; only then are the
//! artifacts published, each on its own.

mod error;
mod pipeline;
mod stats;

#[cfg(test)]
mod tests;

pub use error::{ArtifactError, ConversionError};
pub use pipeline::{
    ArtifactReport, ArtifactStatus, ConversionConfig, ConversionOutcome, MidasConverter,
    PreparedConversion,
};
pub use stats::ConversionStats;
