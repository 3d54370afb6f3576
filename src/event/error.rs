/// Errors that can occur while decoding raw event words
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// A raw token pair does not conform to the expected width or encoding
    #[error("Malformed event at word pair {pair_index} ({token}): {reason}")]
    MalformedEvent {
        /// Index of the offending word pair (0-based)
        pair_index: usize,
        /// The raw token that failed to decode
        token: String,
        /// What was wrong with it
        reason: String,
    },

    /// The token sequence ended in the middle of a word pair
    #[error("Event bank holds an odd number of words ({0}); the last pair is incomplete")]
    IncompletePair(usize),

    /// A position token could not be decoded
    #[error("Malformed position word {token}: {reason}")]
    MalformedPosition {
        /// The raw position token
        token: String,
        /// What was wrong with it
        reason: String,
    },
}
