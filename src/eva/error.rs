/// Errors from writing or reading EVA files
#[derive(Debug, thiserror::Error)]
pub enum EvaError {
    /// I/O error on the output stream
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A bin count does not fit the 2-byte count field
    #[error("Cycle {cycle_index}: channel {channel} holds {count} hits, more than a record can store")]
    CountOverflow {
        /// Cycle of the offending histogram
        cycle_index: usize,
        /// Channel of the offending bin
        channel: u16,
        /// Hit count
        count: u32,
    },

    /// A histogram bin lies outside the configured channel range
    #[error("Cycle {cycle_index}: channel {channel} is outside 0..{num_channels}")]
    ChannelOutOfRange {
        /// Cycle of the offending histogram
        cycle_index: usize,
        /// Offending channel
        channel: u16,
        /// Configured channel count
        num_channels: usize,
    },

    /// A record's declared length does not fit the 2-byte length field
    #[error("Cycle {cycle_index}: record length {length} exceeds the 2-byte length field")]
    RecordTooLong {
        /// Cycle of the offending record
        cycle_index: usize,
        /// Declared length in bytes
        length: usize,
    },

    /// A cycle start time does not fit the 4-byte timestamp field
    #[error("Cycle {cycle_index}: timestamp {value} does not fit a 4-byte integer")]
    TimestampOutOfRange {
        /// Cycle of the offending record
        cycle_index: usize,
        /// Computed start time
        value: f64,
    },

    /// The frequency step count does not fit the 4-byte count field
    #[error("{0} frequency steps do not fit a 4-byte integer")]
    TooManyFrequencySteps(u32),

    /// File ends before a field could be read
    #[error("File truncated at byte {offset}: {needed} more bytes needed")]
    Truncated {
        /// Offset where the read started
        offset: usize,
        /// Bytes required
        needed: usize,
    },

    /// One of the two leading offsets is unusable
    #[error("Invalid {field} {value}")]
    InvalidOffset {
        /// Which offset (`header length` or `data start`)
        field: &'static str,
        /// Stored value
        value: i64,
    },

    /// A histogram record cannot be framed
    #[error("Record {index} at byte {offset}: {reason}")]
    InvalidRecord {
        /// Record number (0-based)
        index: usize,
        /// Byte offset of the record
        offset: usize,
        /// What was wrong
        reason: String,
    },
}
