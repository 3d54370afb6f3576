use log::{debug, warn};

use super::BankError;
use crate::event::TOKEN_WIDTH;

const LENGTH_FIELD: &str = "Length: ";
const TOKEN_PREFIX: &str = "0x";

/// Bytes per 32-bit data word
const WORD_BYTES: usize = 4;

/// Collect every data word of every `marker` bank in a capture, in order.
///
/// Each bank header carries `Length: <bytes>(...)`; the bank contributes
/// `bytes / 4` tokens, each the next `0x`-prefixed run of ten characters.
/// A marker that never occurs yields an empty list.
pub fn extract_bank(marker: &str, text: &str) -> Result<Vec<String>, BankError> {
    let mut tokens = Vec::new();
    let mut banks = 0usize;

    for (offset, _) in text.match_indices(marker) {
        let malformed = |reason: String| BankError::MalformedBank {
            marker: marker.to_string(),
            offset,
            reason,
        };

        let after_marker = offset + marker.len();
        let length_at = text[after_marker..]
            .find(LENGTH_FIELD)
            .map(|i| after_marker + i + LENGTH_FIELD.len())
            .ok_or_else(|| malformed("no Length field".to_string()))?;

        let (byte_count, mut cursor) = parse_length(text, length_at)
            .ok_or_else(|| malformed("unreadable Length field".to_string()))?;

        let words = byte_count / WORD_BYTES;
        for word in 0..words {
            let start = text[cursor..]
                .find(TOKEN_PREFIX)
                .map(|i| cursor + i)
                .ok_or_else(|| malformed(format!("bank ends after {} of {} words", word, words)))?;
            let token = text
                .get(start..start + TOKEN_WIDTH)
                .ok_or_else(|| malformed(format!("word {} is truncated", word)))?;
            tokens.push(token.to_string());
            cursor = start + 1;
        }

        banks += 1;
        debug!("{} bank at byte {}: {} words", marker, offset, words);
    }

    if banks == 0 {
        warn!("No valid {} banks found in capture", marker);
    }

    Ok(tokens)
}

/// Parse the decimal byte count that ends at `(`, returning it with the
/// position just past the digits
fn parse_length(text: &str, at: usize) -> Option<(usize, usize)> {
    let rest = &text[at..];
    let end = rest.find(['(', '\n'])?;
    let count = rest[..end].trim().parse().ok()?;
    Some((count, at + end))
}
