use std::fmt;

/// Counters collected over one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Event bank words read from the capture
    pub event_words: usize,
    /// Position bank words read from the capture
    pub position_words: usize,
    /// Decoded events
    pub events: usize,
    /// Words with an aliased type nibble
    pub anomalies: usize,
    /// Validated cycles written to the EVA file
    pub cycles: usize,
    /// In-gate samples at or above the TOF limit
    pub dropped_samples: usize,
    /// Ion and timestamp events outside any gate
    pub pre_gate_events: usize,
    /// True if the capture ended inside a gate
    pub discarded_trailing_cycle: bool,
    /// Dense EVA records
    pub dense_records: usize,
    /// Sparse EVA records
    pub sparse_records: usize,
    /// EVA file size in bytes
    pub eva_bytes: u64,
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} events ({} anomalous) into {} cycles: {} dense and {} sparse records, {} bytes",
            self.events,
            self.anomalies,
            self.cycles,
            self.dense_records,
            self.sparse_records,
            self.eva_bytes
        )
    }
}
