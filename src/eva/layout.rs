/// Bytes of the length and timestamp fields counted in a record's length
pub const RECORD_OVERHEAD: usize = 4;

/// Encoding of one cycle record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordLayout {
    /// A 2-byte count per channel
    Dense,
    /// `(channel, count)` pairs for occupied channels only
    Sparse,
}

impl RecordLayout {
    /// Dense when fewer than half of the channels are empty.
    ///
    /// The half is an integer division, so with 1000 channels a record is
    /// dense from 501 occupied channels on.
    pub fn choose(num_channels: usize, occupancy: usize) -> Self {
        if num_channels.saturating_sub(occupancy) < num_channels / 2 {
            RecordLayout::Dense
        } else {
            RecordLayout::Sparse
        }
    }

    /// Value of the record's 2-byte length field
    pub fn declared_length(self, num_channels: usize, occupancy: usize) -> usize {
        match self {
            RecordLayout::Dense => num_channels * 2 + RECORD_OVERHEAD,
            RecordLayout::Sparse => occupancy * 4 + RECORD_OVERHEAD,
        }
    }

    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordLayout::Dense => "dense",
            RecordLayout::Sparse => "sparse",
        }
    }
}

impl std::fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
