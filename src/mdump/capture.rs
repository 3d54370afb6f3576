use std::path::Path;
use std::process::Command;

use log::{info, warn};

use super::{extract_bank, BankError, EVENT_BANK, POSITION_BANK};

/// Command used when none is configured
pub const DEFAULT_MDUMP_COMMAND: &str = "mdump";

/// Runs the MIDAS `mdump` tool and captures its text output
#[derive(Debug, Clone)]
pub struct MdumpCapture {
    command: String,
}

impl Default for MdumpCapture {
    fn default() -> Self {
        Self::new(DEFAULT_MDUMP_COMMAND)
    }
}

impl MdumpCapture {
    /// Use the given executable instead of `mdump` on `PATH`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Executable that will be run
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Dump the MPET banks of `run_path` as hex (`-b MPET -x`).
    ///
    /// A non-zero exit status is only logged; whatever was written to stdout
    /// is returned.
    pub fn run<P: AsRef<Path>>(&self, run_path: P) -> Result<String, BankError> {
        let run_path = run_path.as_ref();
        info!("Running {} -b MPET -x {}", self.command, run_path.display());

        let output = Command::new(&self.command)
            .args(["-b", "MPET", "-x"])
            .arg(run_path)
            .output()
            .map_err(|source| BankError::Capture {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            warn!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Read a capture saved earlier with `mdump -b MPET -x <run> > file`
    pub fn read_saved<P: AsRef<Path>>(path: P) -> Result<String, BankError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Event and position words pulled out of one capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureBanks {
    /// `Bank:MPET` words, in capture order
    pub events: Vec<String>,
    /// `Bank:MCPP` words, in capture order
    pub positions: Vec<String>,
}

impl CaptureBanks {
    /// Scan a capture for both bank kinds
    pub fn from_capture(text: &str) -> Result<Self, BankError> {
        let events = extract_bank(EVENT_BANK, text)?;
        let positions = extract_bank(POSITION_BANK, text)?;
        info!(
            "Extracted {} event words and {} position words",
            events.len(),
            positions.len()
        );
        Ok(Self { events, positions })
    }
}
