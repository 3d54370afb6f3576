use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use midas2eva::eva::{EvaFile, RecordLayout};
use midas2eva::metadata::{ExperimentMetadata, MetadataOverrides, RunFile};

/// Display run parameters of a `.mid` file, or a summary of an EVA file
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    if file.extension().is_some_and(|ext| ext == "mid") {
        run_info(&file, json)
    } else {
        eva_info(&file, json)
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "<invalid>".to_string())
}

fn run_info(file: &Path, json: bool) -> Result<()> {
    let run = RunFile::open(file).context("Failed to read run file")?;
    let metadata = ExperimentMetadata::resolve(&run, &MetadataOverrides::default())
        .context("Failed to resolve run parameters from the ODB")?;

    if json {
        println!("{}", metadata.to_json()?);
        return Ok(());
    }

    println!("MIDAS Run Information");
    println!("=====================");
    println!("File: {}", file.display());
    println!();
    println!("Species:          {} (charge {})", metadata.mass, metadata.charge);
    println!("RF amplitude:     {} V", metadata.amplitude_v);
    println!("RF time:          {} s", metadata.rf_time_s);
    println!(
        "Frequency scan:   {} Hz to {} Hz in {} steps",
        metadata.start_freq_hz, metadata.stop_freq_hz, metadata.num_freq_steps
    );
    if let Some(list) = &metadata.quad_freq_list {
        println!("Quad FreqList:    {}", list);
    }
    println!("Cycles:           {}", metadata.num_cycles);
    println!("TDC gate:         {} us", metadata.tdc_gate_width_us);
    println!("Start:            {}", format_time(metadata.start_datetime()));
    println!("Stop:             {}", format_time(metadata.end_datetime()));
    println!("Duration:         {} s", metadata.duration_s());

    Ok(())
}

fn eva_info(file: &Path, json: bool) -> Result<()> {
    let eva = EvaFile::open(file).context("Failed to read EVA file")?;

    let dense = eva
        .records
        .iter()
        .filter(|r| r.layout == RecordLayout::Dense)
        .count();
    let sparse = eva.records.len() - dense;
    let total_hits: i64 = eva.records.iter().map(|r| r.total_hits()).sum();
    let first = eva.records.first().map(|r| r.timestamp);
    let last = eva.records.last().map(|r| r.timestamp);
    let to_time = |ts: Option<i32>| ts.and_then(|s| DateTime::from_timestamp(i64::from(s), 0));

    if json {
        let summary = serde_json::json!({
            "file": file.display().to_string(),
            "header_length": eva.header_length,
            "data_start": eva.data_start,
            "mass": eva.header.get("Mass", "Mass"),
            "channels": eva.header.channels(),
            "time_per_channel": eva.header.get("MCA", "TimePerChannel"),
            "frequencies": eva.frequencies,
            "records": eva.records.len(),
            "dense_records": dense,
            "sparse_records": sparse,
            "total_hits": total_hits,
            "first_cycle": to_time(first).map(|t| t.to_rfc3339()),
            "last_cycle": to_time(last).map(|t| t.to_rfc3339()),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("EVA File Information");
    println!("====================");
    println!("File: {}", file.display());
    println!();

    println!("Layout:");
    println!("  Header length: {} bytes", eva.header_length);
    println!("  Records start: byte {}", eva.data_start);
    println!();

    println!("Header:");
    for section in eva.header.sections() {
        println!("  [{}]", section.name);
        for (key, value) in &section.fields {
            println!("    {} = {}", key, value);
        }
    }
    println!();

    println!("Frequency table: {} entries", eva.frequencies.len());
    if let (Some(lo), Some(hi)) = (eva.frequencies.first(), eva.frequencies.last()) {
        println!("  {} Hz to {} Hz", lo, hi);
    }
    println!();

    println!("Records: {} ({} dense, {} sparse)", eva.records.len(), dense, sparse);
    println!("  Total hits: {}", total_hits);
    if first.is_some() {
        println!("  First cycle: {}", format_time(to_time(first)));
        println!("  Last cycle:  {}", format_time(to_time(last)));
    }

    Ok(())
}
