use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use midas2eva::validator::validate_eva_file;

/// Validate an EVA file; fails when any check fails
pub fn run(file: PathBuf) -> Result<()> {
    info!("EVA Validator");
    info!("=============");
    info!("File: {}", file.display());

    let report = validate_eva_file(&file).context("Validation could not run")?;

    // Plain text unless built with colorized_output
    println!("{}", report.format_colored());

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} checks failed",
            report.failure_count(),
            report.checks.len()
        );
    }

    Ok(())
}
