use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use super::{EvaError, EvaHeader, RecordLayout, RECORD_OVERHEAD};

/// One cycle record read back from an EVA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaRecord {
    /// Byte offset of the length field
    pub offset: usize,
    /// Declared length (timestamp plus payload)
    pub declared_length: u16,
    /// Cycle start time (epoch seconds)
    pub timestamp: i32,
    /// Inferred layout
    pub layout: RecordLayout,
    /// `(channel, count)` entries; a dense record lists every stored channel
    pub bins: Vec<(u16, i16)>,
}

impl EvaRecord {
    /// Sum of all counts
    pub fn total_hits(&self) -> i64 {
        self.bins.iter().map(|&(_, c)| i64::from(c)).sum()
    }

    /// Channels holding a non-zero count
    pub fn occupancy(&self) -> usize {
        self.bins.iter().filter(|&&(_, c)| c != 0).count()
    }
}

/// An EVA file parsed back into its parts
#[derive(Debug, Clone)]
pub struct EvaFile {
    /// Value stored at offset 0
    pub header_length: u32,
    /// Value stored at offset 4
    pub data_start: u32,
    /// Parsed text header
    pub header: EvaHeader,
    /// Step count written before the frequency table
    pub num_freq_steps: i32,
    /// Frequency table
    pub frequencies: Vec<f64>,
    /// Integer after the table (1 in well-formed files)
    pub sentinel_count: i32,
    /// Float after the table (0.0 in well-formed files)
    pub sentinel_value: f64,
    /// Byte offset just past the sentinels
    pub frequency_table_end: usize,
    /// Cycle records from `data_start` to the end of the file
    pub records: Vec<EvaRecord>,
}

impl EvaFile {
    /// Read and parse a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EvaError> {
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    /// Parse an in-memory file.
    ///
    /// Records are framed by their declared length, so dense records must
    /// be zero-filled. A record is read as sparse when its payload is a
    /// strictly increasing run of in-range `(channel, count)` pairs, and
    /// otherwise as dense when its declared length is the dense length for
    /// the header's channel count.
    pub fn parse(bytes: &[u8]) -> Result<Self, EvaError> {
        let mut cursor = ByteCursor::new(bytes);

        let header_length = cursor.i32()?;
        let data_start = cursor.i32()?;

        let header_end = usize::try_from(header_length)
            .ok()
            .and_then(|len| len.checked_add(8))
            .filter(|&end| end <= bytes.len())
            .ok_or(EvaError::InvalidOffset {
                field: "header length",
                value: i64::from(header_length),
            })?;
        let records_start = usize::try_from(data_start)
            .ok()
            .filter(|&start| start >= header_end && start <= bytes.len())
            .ok_or(EvaError::InvalidOffset {
                field: "data start",
                value: i64::from(data_start),
            })?;

        let header = EvaHeader::parse(&bytes[8..header_end]);
        let num_channels = header.channels();

        cursor.seek(header_end);
        let num_freq_steps = cursor.i32()?;
        let table_len = usize::try_from(num_freq_steps).map_err(|_| EvaError::InvalidOffset {
            field: "frequency count",
            value: i64::from(num_freq_steps),
        })?;
        let mut frequencies = Vec::with_capacity(table_len.min(bytes.len() / 8));
        for _ in 0..table_len {
            frequencies.push(cursor.f64()?);
        }
        let sentinel_count = cursor.i32()?;
        let sentinel_value = cursor.f64()?;
        let frequency_table_end = cursor.position();

        cursor.seek(records_start);
        let mut records = Vec::new();
        while !cursor.is_empty() {
            records.push(read_record(&mut cursor, records.len(), num_channels)?);
        }

        Ok(Self {
            header_length: header_length as u32,
            data_start: data_start as u32,
            header,
            num_freq_steps,
            frequencies,
            sentinel_count,
            sentinel_value,
            frequency_table_end,
            records,
        })
    }
}

fn read_record(
    cursor: &mut ByteCursor<'_>,
    index: usize,
    num_channels: Option<usize>,
) -> Result<EvaRecord, EvaError> {
    let offset = cursor.position();
    let invalid = |reason: &str| EvaError::InvalidRecord {
        index,
        offset,
        reason: reason.to_string(),
    };

    if cursor.remaining() < 2 + RECORD_OVERHEAD {
        return Err(invalid("incomplete record header"));
    }
    let declared = cursor.i16()?;
    let declared_length = u16::try_from(declared)
        .ok()
        .filter(|&len| usize::from(len) >= RECORD_OVERHEAD)
        .ok_or_else(|| invalid("declared length below 4"))?;
    let timestamp = cursor.i32()?;

    let payload_len = usize::from(declared_length) - RECORD_OVERHEAD;
    let payload = cursor
        .take(payload_len)
        .ok_or_else(|| invalid("declared length runs past the end of the file"))?;

    let words: Vec<i16> = payload.chunks_exact(2).map(LittleEndian::read_i16).collect();
    let is_dense_length =
        num_channels.map(|n| n * 2 + RECORD_OVERHEAD) == Some(usize::from(declared_length));

    let (layout, bins) = match sparse_pairs(&words, payload_len, num_channels) {
        Some(pairs) => (RecordLayout::Sparse, pairs),
        None if is_dense_length => {
            let bins = words
                .iter()
                .enumerate()
                .map(|(channel, &count)| (channel as u16, count))
                .collect();
            (RecordLayout::Dense, bins)
        }
        None => return Err(invalid("payload is neither dense nor sparse")),
    };

    Ok(EvaRecord {
        offset,
        declared_length,
        timestamp,
        layout,
        bins,
    })
}

/// Interpret a payload as strictly increasing in-range `(channel, count)`
/// pairs with positive counts
fn sparse_pairs(
    words: &[i16],
    payload_len: usize,
    num_channels: Option<usize>,
) -> Option<Vec<(u16, i16)>> {
    if payload_len % 4 != 0 {
        return None;
    }
    let limit = num_channels.unwrap_or(usize::MAX);
    let mut pairs = Vec::with_capacity(words.len() / 2);
    let mut previous: Option<u16> = None;

    for pair in words.chunks_exact(2) {
        let channel = u16::try_from(pair[0]).ok()?;
        let count = pair[1];
        if usize::from(channel) >= limit || count < 1 || previous.is_some_and(|p| channel <= p) {
            return None;
        }
        previous = Some(channel);
        pairs.push((channel, count));
    }
    Some(pairs)
}

struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.bytes.len());
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn field(&mut self, len: usize) -> Result<&'a [u8], EvaError> {
        let offset = self.pos;
        self.take(len)
            .ok_or(EvaError::Truncated { offset, needed: len })
    }

    fn i16(&mut self) -> Result<i16, EvaError> {
        Ok(LittleEndian::read_i16(self.field(2)?))
    }

    fn i32(&mut self) -> Result<i32, EvaError> {
        Ok(LittleEndian::read_i32(self.field(4)?))
    }

    fn f64(&mut self) -> Result<f64, EvaError> {
        Ok(LittleEndian::read_f64(self.field(8)?))
    }
}
