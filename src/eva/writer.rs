use std::fmt;
use std::io::{Cursor, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};

use super::{render_header, EvaError, RecordLayout};
use crate::cycle::{BinningConfig, CycleHistogram};
use crate::metadata::ExperimentMetadata;

/// Integer written after the frequency table
pub const FREQUENCY_SENTINEL_COUNT: i32 = 1;

/// Float written after the sentinel integer
pub const FREQUENCY_SENTINEL_VALUE: f64 = 0.0;

/// Options for the EVA serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaConfig {
    /// Write a count for every channel of a dense record, zeros included.
    ///
    /// Off by default: dense records then carry counts for occupied channels
    /// only, as existing EVA files do, and are shorter than their declared
    /// length unless every channel is occupied.
    pub dense_zero_fill: bool,
}

/// Statistics from a completed EVA serialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaWriteStats {
    /// Value back-patched at offset 0
    pub header_length: u32,
    /// Value back-patched at offset 4
    pub data_start: u32,
    /// Number of frequencies in the table
    pub frequencies: usize,
    /// Records written with the dense layout
    pub dense_records: usize,
    /// Records written with the sparse layout
    pub sparse_records: usize,
    /// Dense records whose payload is shorter than their declared length
    pub short_dense_records: usize,
    /// Total bytes written
    pub bytes_written: u64,
}

impl EvaWriteStats {
    /// Total number of cycle records
    pub fn records(&self) -> usize {
        self.dense_records + self.sparse_records
    }
}

impl fmt::Display for EvaWriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} records ({} dense, {} sparse), {} frequencies, {} bytes",
            self.records(),
            self.dense_records,
            self.sparse_records,
            self.frequencies,
            self.bytes_written
        )
    }
}

/// A fully serialized EVA file held in memory
#[derive(Debug, Clone)]
pub struct EvaArtifact {
    /// File contents
    pub bytes: Vec<u8>,
    /// What was written
    pub stats: EvaWriteStats,
}

/// Writes the EVA header, frequency table and cycle records
#[derive(Debug, Clone, Default)]
pub struct EvaSerializer {
    config: EvaConfig,
}

impl EvaSerializer {
    /// Create a serializer
    pub fn new(config: EvaConfig) -> Self {
        Self { config }
    }

    /// Serialize into memory
    pub fn serialize(
        &self,
        metadata: &ExperimentMetadata,
        binning: &BinningConfig,
        frequencies: &[f64],
        histograms: &[CycleHistogram],
    ) -> Result<EvaArtifact, EvaError> {
        let mut cursor = Cursor::new(Vec::new());
        let stats = self.write(&mut cursor, metadata, binning, frequencies, histograms)?;
        Ok(EvaArtifact {
            bytes: cursor.into_inner(),
            stats,
        })
    }

    /// Serialize into a seekable stream positioned at its start.
    ///
    /// The two leading offsets are written as placeholders and back-patched
    /// once the header and the frequency table are in place.
    pub fn write<W: Write + Seek>(
        &self,
        out: &mut W,
        metadata: &ExperimentMetadata,
        binning: &BinningConfig,
        frequencies: &[f64],
        histograms: &[CycleHistogram],
    ) -> Result<EvaWriteStats, EvaError> {
        let mut stats = EvaWriteStats {
            frequencies: frequencies.len(),
            ..Default::default()
        };

        out.write_i32::<LittleEndian>(1)?;
        out.write_i32::<LittleEndian>(2)?;
        out.write_all(&render_header(metadata, binning))?;

        stats.header_length = (out.stream_position()? - 8) as u32;
        patch_i32(out, 0, stats.header_length)?;

        let steps = i32::try_from(metadata.num_freq_steps)
            .map_err(|_| EvaError::TooManyFrequencySteps(metadata.num_freq_steps))?;
        out.write_i32::<LittleEndian>(steps)?;
        for &frequency in frequencies {
            out.write_f64::<LittleEndian>(frequency)?;
        }
        out.write_i32::<LittleEndian>(FREQUENCY_SENTINEL_COUNT)?;
        out.write_f64::<LittleEndian>(FREQUENCY_SENTINEL_VALUE)?;

        stats.data_start = out.stream_position()? as u32;
        patch_i32(out, 4, stats.data_start)?;
        debug!(
            "Header length {}, records start at byte {}",
            stats.header_length, stats.data_start
        );

        let num_channels = binning.num_channels();
        let cycle_seconds = if histograms.is_empty() {
            0.0
        } else {
            metadata.duration_s() / histograms.len() as f64
        };

        let mut records = Vec::new();
        for (i, histogram) in histograms.iter().enumerate() {
            let timestamp = metadata.start_time + i as f64 * cycle_seconds;
            let layout = self.encode_record(&mut records, histogram, num_channels, timestamp)?;
            match layout {
                RecordLayout::Dense => {
                    stats.dense_records += 1;
                    if !self.config.dense_zero_fill && histogram.occupancy() < num_channels {
                        stats.short_dense_records += 1;
                    }
                }
                RecordLayout::Sparse => stats.sparse_records += 1,
            }
        }
        out.write_all(&records)?;
        out.flush()?;

        stats.bytes_written = out.stream_position()?;
        info!("{}", stats);
        Ok(stats)
    }

    /// Append one cycle record, returning the layout used
    pub fn encode_record(
        &self,
        buf: &mut Vec<u8>,
        histogram: &CycleHistogram,
        num_channels: usize,
        timestamp: f64,
    ) -> Result<RecordLayout, EvaError> {
        let cycle_index = histogram.cycle_index();
        let occupancy = histogram.occupancy();

        if let Some(channel) = histogram.max_channel() {
            if usize::from(channel) >= num_channels {
                return Err(EvaError::ChannelOutOfRange {
                    cycle_index,
                    channel,
                    num_channels,
                });
            }
        }

        let layout = RecordLayout::choose(num_channels, occupancy);
        let length = layout.declared_length(num_channels, occupancy);
        let declared = i16::try_from(length).map_err(|_| EvaError::RecordTooLong {
            cycle_index,
            length,
        })?;

        // Float start times truncate toward zero.
        let truncated = timestamp.trunc();
        if !(f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&truncated) {
            return Err(EvaError::TimestampOutOfRange {
                cycle_index,
                value: timestamp,
            });
        }

        buf.write_i16::<LittleEndian>(declared)?;
        buf.write_i32::<LittleEndian>(truncated as i32)?;

        let count_field = |channel: u16, count: u32| {
            i16::try_from(count).map_err(|_| EvaError::CountOverflow {
                cycle_index,
                channel,
                count,
            })
        };

        match layout {
            RecordLayout::Dense if self.config.dense_zero_fill => {
                for channel in 0..num_channels as u16 {
                    let count = histogram.count(channel);
                    buf.write_i16::<LittleEndian>(count_field(channel, count)?)?;
                }
            }
            RecordLayout::Dense => {
                for (channel, count) in histogram.iter() {
                    buf.write_i16::<LittleEndian>(count_field(channel, count)?)?;
                }
            }
            RecordLayout::Sparse => {
                for (channel, count) in histogram.iter() {
                    buf.write_i16::<LittleEndian>(channel as i16)?;
                    buf.write_i16::<LittleEndian>(count_field(channel, count)?)?;
                }
            }
        }

        Ok(layout)
    }
}

fn patch_i32<W: Write + Seek>(out: &mut W, offset: u64, value: u32) -> Result<(), EvaError> {
    out.seek(SeekFrom::Start(offset))?;
    out.write_i32::<LittleEndian>(value as i32)?;
    out.seek(SeekFrom::End(0))?;
    Ok(())
}
