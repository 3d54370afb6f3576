//! # EVA Validation Module
//!
//! Integrity checks for `.dat` EVA files, whether written by this crate or
//! by another converter.
//!
//! ## Validation Checklist
//!
//! 1. **Structure**: the two leading offsets point inside the file and the
//!    record stream frames cleanly
//! 2. **Header**: all six sections are present, `[MCA]` declares a channel
//!    count and `[SCAN0]` agrees with the frequency table
//! 3. **Data**: the frequency table and its sentinels, record bin ranges,
//!    counts and timestamp order
//!
//! A check that cannot run because an earlier one failed is skipped. Only
//! I/O errors are returned as errors; everything else lands in the report.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use midas2eva::validator::validate_eva_file;
//! use std::path::Path;
//!
//! match validate_eva_file(Path::new("run00042_eva.dat")) {
//!     Ok(report) => println!("{}", report),
//!     Err(e) => eprintln!("Validation failed: {}", e),
//! }
//! ```

use std::path::Path;

pub use report::{CheckStatus, ValidationCheck, ValidationReport};

mod data;
mod header;
mod report;
mod structure;


/// Errors that prevent validation from running at all
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Path is missing or not a regular file
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Validate an EVA file on disk
pub fn validate_eva_file(path: &Path) -> Result<ValidationReport, ValidationError> {
    if !path.is_file() {
        return Err(ValidationError::NotAFile(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    Ok(validate_eva_bytes(path.display().to_string(), &bytes))
}

/// Validate an in-memory EVA file, labelled `name` in the report
pub fn validate_eva_bytes(name: impl Into<String>, bytes: &[u8]) -> ValidationReport {
    let mut report = ValidationReport::new(name);

    // 1. Structure
    let Some(file) = structure::check_structure(bytes, &mut report) else {
        return report;
    };

    // 2. Header
    let channels = header::check_header(&file, &mut report);

    // 3. Data
    data::check_frequency_table(&file, &mut report);
    data::check_records(&file, channels, &mut report);

    report
}
