/// Errors from capturing or scanning `mdump` output
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    /// The dump tool could not be started
    #[error("Failed to run {command}: {source}")]
    Capture {
        /// Command that was spawned
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// I/O error reading a saved capture
    #[error("Failed to read capture: {0}")]
    IoError(#[from] std::io::Error),

    /// A bank section does not have the expected shape
    #[error("Malformed {marker} bank at byte {offset}: {reason}")]
    MalformedBank {
        /// Bank marker, e.g. `Bank:MPET`
        marker: String,
        /// Byte offset of the bank marker in the capture text
        offset: usize,
        /// What was wrong
        reason: String,
    },
}
