use std::path::{Path, PathBuf};

use log::{error, info, warn};

use super::{ArtifactError, ConversionError, ConversionStats};
use crate::cycle::{BinningConfig, CycleProcessor};
use crate::eva::{EvaArtifact, EvaConfig, EvaSerializer};
use crate::event::{DecodeError, EventDecoder};
use crate::frequency::{FrequencyListBuilder, FrequencyListPolicy};
use crate::mdump::CaptureBanks;
use crate::metadata::{ExperimentMetadata, MetadataOverrides, RunFile};
use crate::output::{
    position_lines, publish_atomically, token_lines, ArtifactKind, OutputDirs, OutputPaths,
};

/// Everything that shapes a conversion
#[derive(Debug, Clone, Default)]
pub struct ConversionConfig {
    /// Values that replace ODB lookups
    pub overrides: MetadataOverrides,
    /// TOF binning and gate counter origin
    pub binning: BinningConfig,
    /// Handling of an unparsable `Quad FreqList`
    pub frequency_policy: FrequencyListPolicy,
    /// EVA record options
    pub eva: EvaConfig,
    /// Artifact directories
    pub output: OutputDirs,
}

/// All artifacts of a run, rendered in memory and not yet written
#[derive(Debug, Clone)]
pub struct PreparedConversion {
    /// Resolved run metadata
    pub metadata: ExperimentMetadata,
    /// Serialized EVA file
    pub eva: EvaArtifact,
    /// Raw event word echo
    pub dump: String,
    /// Position file, if the capture had position words
    pub positions: Option<Result<String, DecodeError>>,
    /// Anomaly echo, if any word was anomalous
    pub anomalies: Option<String>,
    /// Counters
    pub stats: ConversionStats,
}

/// What happened to one artifact
#[derive(Debug)]
pub enum ArtifactStatus {
    /// Published with this many bytes
    Written(u64),
    /// Nothing to write
    Skipped,
    /// Not written
    Failed(ArtifactError),
}

/// Outcome of one artifact
#[derive(Debug)]
pub struct ArtifactReport {
    /// Which artifact
    pub kind: ArtifactKind,
    /// Destination path
    pub path: PathBuf,
    /// What happened
    pub status: ArtifactStatus,
}

impl ArtifactReport {
    /// True unless the artifact failed
    pub fn is_ok(&self) -> bool {
        !matches!(self.status, ArtifactStatus::Failed(_))
    }
}

/// Result of a conversion whose integrity checks passed
#[derive(Debug)]
pub struct ConversionOutcome {
    /// Resolved run metadata
    pub metadata: ExperimentMetadata,
    /// Counters
    pub stats: ConversionStats,
    /// One report per artifact kind
    pub artifacts: Vec<ArtifactReport>,
}

impl ConversionOutcome {
    /// Artifacts that could not be written
    pub fn failures(&self) -> impl Iterator<Item = &ArtifactReport> + '_ {
        self.artifacts.iter().filter(|a| !a.is_ok())
    }

    /// True if every artifact was written or deliberately skipped
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Report for one artifact kind
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactReport> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// Converts MIDAS run files into EVA files
#[derive(Debug, Clone, Default)]
pub struct MidasConverter {
    config: ConversionConfig,
}

impl MidasConverter {
    /// Create a converter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with the given settings
    pub fn with_config(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert a run file using its `mdump` capture text.
    ///
    /// Errors are returned only for problems found before the write stage;
    /// in that case no artifact is created. Write failures are reported per
    /// artifact in the outcome.
    pub fn convert<P: AsRef<Path>>(
        &self,
        run_path: P,
        capture: &str,
    ) -> Result<ConversionOutcome, ConversionError> {
        let run = RunFile::open(run_path)?;
        let prepared = self.prepare(&run, capture)?;
        let paths = OutputPaths::new(run.path(), &self.config.output);
        Ok(self.publish(prepared, &paths))
    }

    /// Run every stage up to, but not including, writing files
    pub fn prepare(
        &self,
        run: &RunFile,
        capture: &str,
    ) -> Result<PreparedConversion, ConversionError> {
        let metadata = ExperimentMetadata::resolve(run, &self.config.overrides)?;

        let banks = CaptureBanks::from_capture(capture)?;
        let decoded = EventDecoder::new().decode(&banks.events)?;

        let cycles = CycleProcessor::new(self.config.binning.clone()).process(decoded.iter())?;
        if cycles.histograms.len() != metadata.num_cycles as usize {
            warn!(
                "Run declares {} cycles but {} were validated",
                metadata.num_cycles,
                cycles.histograms.len()
            );
        }

        let frequencies = FrequencyListBuilder::new(self.config.frequency_policy).build(&metadata)?;

        let eva = EvaSerializer::new(self.config.eva).serialize(
            &metadata,
            &self.config.binning,
            &frequencies,
            &cycles.histograms,
        )?;
        if eva.stats.short_dense_records > 0 {
            warn!(
                "{} dense records carry fewer counts than their declared length; \
                 enable dense_zero_fill for self-framing records",
                eva.stats.short_dense_records
            );
        }

        let stats = ConversionStats {
            event_words: banks.events.len(),
            position_words: banks.positions.len(),
            events: decoded.len(),
            anomalies: decoded.anomalies.len(),
            cycles: cycles.histograms.len(),
            dropped_samples: cycles.dropped_samples,
            pre_gate_events: cycles.pre_gate_events,
            discarded_trailing_cycle: cycles.discarded_trailing_cycle,
            dense_records: eva.stats.dense_records,
            sparse_records: eva.stats.sparse_records,
            eva_bytes: eva.stats.bytes_written,
        };
        info!("{}", stats);

        let positions = if banks.positions.is_empty() {
            None
        } else {
            Some(position_lines(&banks.positions))
        };
        let anomalies = if decoded.anomalies.is_empty() {
            None
        } else {
            Some(token_lines(&decoded.anomalies))
        };

        Ok(PreparedConversion {
            metadata,
            dump: token_lines(&banks.events),
            eva,
            positions,
            anomalies,
            stats,
        })
    }

    /// Write every artifact, each independently of the others
    pub fn publish(&self, prepared: PreparedConversion, paths: &OutputPaths) -> ConversionOutcome {
        let PreparedConversion {
            metadata,
            eva,
            dump,
            positions,
            anomalies,
            stats,
        } = prepared;

        let contents: [(ArtifactKind, Option<Result<Vec<u8>, DecodeError>>); 4] = [
            (ArtifactKind::Eva, Some(Ok(eva.bytes))),
            (ArtifactKind::Dump, Some(Ok(dump.into_bytes()))),
            (
                ArtifactKind::Position,
                positions.map(|p| p.map(String::into_bytes)),
            ),
            (ArtifactKind::Errors, anomalies.map(|a| Ok(a.into_bytes()))),
        ];

        let artifacts = contents
            .into_iter()
            .map(|(kind, content)| {
                let path = paths.path(kind).to_path_buf();
                let status = match content {
                    None => ArtifactStatus::Skipped,
                    Some(Err(e)) => ArtifactStatus::Failed(ArtifactError::Content(e)),
                    Some(Ok(bytes)) => match publish_atomically(&path, &bytes) {
                        Ok(written) => ArtifactStatus::Written(written),
                        Err(e) => ArtifactStatus::Failed(ArtifactError::Write(e)),
                    },
                };
                match &status {
                    ArtifactStatus::Written(bytes) => {
                        info!("Wrote {} file {} ({} bytes)", kind, path.display(), bytes)
                    }
                    ArtifactStatus::Skipped => info!("No {} file to write", kind),
                    ArtifactStatus::Failed(e) => error!("Skipped {} file: {}", kind, e),
                }
                ArtifactReport { kind, path, status }
            })
            .collect();

        ConversionOutcome {
            metadata,
            stats,
            artifacts,
        }
    }
}
