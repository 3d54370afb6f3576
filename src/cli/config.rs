//! TOML configuration file support.
//!
//! Settings that would otherwise need many flags can live in a config file:
//!
//! ```toml
//! # midas2eva.toml
//! [metadata]
//! mass = "85Rb"
//! num_freq_steps = 41
//!
//! [binning]
//! bin_width_us = 0.1
//! max_tof_us = 100.0
//! first_gate_counter = 0
//!
//! [frequency]
//! strict = false
//!
//! [eva]
//! dense_zero_fill = true
//!
//! [output]
//! directory = "eva"
//! err_dir = "logs"
//!
//! [capture]
//! mdump_command = "/opt/midas/bin/mdump"
//! ```
//!
//! Command-line flags take precedence over the file, and the file over the
//! values found in the run's ODB.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use midas2eva::metadata::MetadataOverrides;
use midas2eva::output::OutputDirs;

/// Root of a midas2eva.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Run parameter overrides
    #[serde(default)]
    pub metadata: MetadataOverrides,

    /// TOF histogram settings
    #[serde(default)]
    pub binning: BinningSection,

    /// Frequency list handling
    #[serde(default)]
    pub frequency: FrequencySection,

    /// EVA record options
    #[serde(default)]
    pub eva: EvaSection,

    /// Artifact directories
    #[serde(default)]
    pub output: OutputDirs,

    /// How the capture is obtained
    #[serde(default)]
    pub capture: CaptureSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinningSection {
    /// Channel width (us)
    pub bin_width_us: Option<f64>,
    /// TOF limit (us)
    pub max_tof_us: Option<f64>,
    /// Gate counter of the first cycle
    pub first_gate_counter: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrequencySection {
    /// Fail on an unparsable `Quad FreqList` instead of falling back
    pub strict: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaSection {
    /// Write every channel in dense records
    pub dense_zero_fill: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureSection {
    /// mdump executable
    pub mdump_command: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
