use anyhow::{Context, Result};
use clap::Args;
use log::{error, info};
use std::path::PathBuf;

use midas2eva::converter::{ArtifactStatus, ConversionConfig, MidasConverter};
use midas2eva::cycle::{BinningConfig, DEFAULT_BIN_WIDTH_US, DEFAULT_MAX_TOF_US};
use midas2eva::eva::EvaConfig;
use midas2eva::frequency::FrequencyListPolicy;
use midas2eva::mdump::{MdumpCapture, DEFAULT_MDUMP_COMMAND};
use midas2eva::metadata::MetadataOverrides;
use midas2eva::output::OutputDirs;

use super::config::Config;

/// Arguments of the `convert` command
#[derive(Args)]
pub struct ConvertArgs {
    /// MIDAS run file (.mid)
    #[arg(value_name = "RUN")]
    input: PathBuf,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read a saved `mdump -b MPET -x` capture instead of running mdump
    #[arg(long, value_name = "FILE")]
    capture: Option<PathBuf>,

    /// mdump executable
    #[arg(long, value_name = "COMMAND")]
    mdump: Option<String>,

    // === Binning ===
    /// TOF channel width (us)
    #[arg(long, value_name = "US")]
    bin_width: Option<f64>,

    /// TOF limit (us); later samples are dropped
    #[arg(long, value_name = "US")]
    max_tof: Option<f64>,

    /// Gate counter the hardware assigns to the first cycle
    #[arg(long, value_name = "N")]
    first_gate_counter: Option<u16>,

    /// Fail on an unparsable Quad FreqList instead of using the start/stop ramp
    #[arg(long)]
    strict_freq_list: bool,

    /// Write every channel in dense records, so the file can be read back
    #[arg(long)]
    dense_zero_fill: bool,

    // === Output ===
    /// Directory for all artifacts (default: next to the run file)
    #[arg(short = 'o', long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Directory for the EVA file
    #[arg(long, value_name = "DIR")]
    eva_dir: Option<PathBuf>,

    /// Directory for the raw word dump
    #[arg(long, value_name = "DIR")]
    dump_dir: Option<PathBuf>,

    /// Directory for the position file
    #[arg(long, value_name = "DIR")]
    pos_dir: Option<PathBuf>,

    /// Directory for the anomaly echo
    #[arg(long, value_name = "DIR")]
    err_dir: Option<PathBuf>,

    // === Run parameter overrides (bypass the ODB) ===
    /// Species label, e.g. 85Rb
    #[arg(long, help_heading = "Overrides")]
    mass: Option<String>,

    /// Charge state
    #[arg(long, help_heading = "Overrides")]
    charge: Option<i32>,

    /// RF amplitude (V)
    #[arg(long, value_name = "V", help_heading = "Overrides")]
    amplitude: Option<f64>,

    /// Start frequency (Hz)
    #[arg(long, value_name = "HZ", help_heading = "Overrides")]
    start_freq: Option<f64>,

    /// Stop frequency (Hz)
    #[arg(long, value_name = "HZ", help_heading = "Overrides")]
    stop_freq: Option<f64>,

    /// Number of frequency steps
    #[arg(long, value_name = "N", help_heading = "Overrides")]
    freq_steps: Option<u32>,

    /// Number of scan cycles
    #[arg(long, value_name = "N", help_heading = "Overrides")]
    cycles: Option<u32>,

    /// RF excitation time (s)
    #[arg(long, value_name = "S", help_heading = "Overrides")]
    rf_time: Option<f64>,

    /// TDC gate width (us)
    #[arg(long, value_name = "US", help_heading = "Overrides")]
    tdc_gate: Option<f64>,

    /// Run start (epoch seconds)
    #[arg(long, value_name = "EPOCH", help_heading = "Overrides")]
    start_time: Option<f64>,

    /// Run stop (epoch seconds)
    #[arg(long, value_name = "EPOCH", help_heading = "Overrides")]
    end_time: Option<f64>,
}

impl ConvertArgs {
    fn overrides(&self) -> MetadataOverrides {
        MetadataOverrides {
            mass: self.mass.clone(),
            charge: self.charge,
            amplitude_v: self.amplitude,
            start_freq_hz: self.start_freq,
            stop_freq_hz: self.stop_freq,
            num_freq_steps: self.freq_steps,
            num_cycles: self.cycles,
            rf_time_s: self.rf_time,
            tdc_gate_width_us: self.tdc_gate,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    fn output_dirs(&self, file: OutputDirs) -> OutputDirs {
        OutputDirs {
            directory: self.output_dir.clone().or(file.directory),
            eva_dir: self.eva_dir.clone().or(file.eva_dir),
            dump_dir: self.dump_dir.clone().or(file.dump_dir),
            pos_dir: self.pos_dir.clone().or(file.pos_dir),
            err_dir: self.err_dir.clone().or(file.err_dir),
        }
    }

    /// Merge flags over the config file into a library configuration
    fn conversion_config(&self, file: Config) -> Result<(ConversionConfig, Option<String>)> {
        let bin_width = self
            .bin_width
            .or(file.binning.bin_width_us)
            .unwrap_or(DEFAULT_BIN_WIDTH_US);
        let max_tof = self
            .max_tof
            .or(file.binning.max_tof_us)
            .unwrap_or(DEFAULT_MAX_TOF_US);
        let first_gate_counter = self
            .first_gate_counter
            .or(file.binning.first_gate_counter)
            .unwrap_or(0);
        let binning = BinningConfig::new(bin_width, max_tof)
            .context("Invalid binning settings")?
            .with_first_gate_counter(first_gate_counter);

        let strict = self.strict_freq_list || file.frequency.strict.unwrap_or(false);
        let frequency_policy = if strict {
            FrequencyListPolicy::Strict
        } else {
            FrequencyListPolicy::Lenient
        };

        let eva = EvaConfig {
            dense_zero_fill: self.dense_zero_fill || file.eva.dense_zero_fill.unwrap_or(false),
        };

        let config = ConversionConfig {
            overrides: self.overrides().or(file.metadata),
            binning,
            frequency_policy,
            eva,
            output: self.output_dirs(file.output),
        };
        let mdump = self.mdump.clone().or(file.capture.mdump_command);
        Ok((config, mdump))
    }
}

/// Convert a MIDAS run file to EVA
pub fn run(args: ConvertArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let (config, mdump) = args.conversion_config(file_config)?;

    info!("midas2eva - MIDAS to EVA");
    info!("========================");
    info!("Run file: {}", args.input.display());
    info!(
        "Binning: {} us channels up to {} us ({} channels)",
        config.binning.bin_width_us(),
        config.binning.max_tof_us(),
        config.binning.num_channels()
    );
    if config.eva.dense_zero_fill {
        info!("Dense records: zero-filled");
    }

    let capture = match &args.capture {
        Some(path) => {
            info!("Capture: {}", path.display());
            MdumpCapture::read_saved(path)
                .with_context(|| format!("Failed to read capture {}", path.display()))?
        }
        None => {
            let capture = MdumpCapture::new(mdump.as_deref().unwrap_or(DEFAULT_MDUMP_COMMAND));
            info!("Capture: running {}", capture.command());
            capture.run(&args.input).context("Failed to capture event banks")?
        }
    };

    let converter = MidasConverter::with_config(config);
    let outcome = converter
        .convert(&args.input, &capture)
        .with_context(|| format!("Conversion of {} failed", args.input.display()))?;

    info!("Conversion complete!");
    info!("  {}", outcome.stats);
    for artifact in &outcome.artifacts {
        match &artifact.status {
            ArtifactStatus::Written(bytes) => {
                info!("  {}: {} ({} bytes)", artifact.kind, artifact.path.display(), bytes)
            }
            ArtifactStatus::Skipped => info!("  {}: nothing to write", artifact.kind),
            ArtifactStatus::Failed(e) => error!("  {}: {}", artifact.kind, e),
        }
    }

    let failed = outcome.failures().count();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} artifacts could not be written",
            failed,
            outcome.artifacts.len()
        );
    }

    Ok(())
}
