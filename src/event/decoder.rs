use log::{debug, warn};

use super::{
    DecodeError, DecodedEvent, DecodedEvents, Event, EventKind, GATE_COUNTER_LIMIT, TOF_TICK_US,
    TOKEN_WIDTH,
};

/// Two consecutive event-bank words: type/counter word and TOF word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawWordPair<'a> {
    /// Event type nibble and gate counter
    pub first: &'a str,
    /// Scaled time of flight
    pub second: &'a str,
}

impl<'a> RawWordPair<'a> {
    /// Group a token sequence into word pairs
    pub fn pairs<S: AsRef<str>>(tokens: &'a [S]) -> Result<Vec<RawWordPair<'a>>, DecodeError> {
        if tokens.len() % 2 != 0 {
            return Err(DecodeError::IncompletePair(tokens.len()));
        }

        Ok(tokens
            .chunks_exact(2)
            .map(|pair| RawWordPair {
                first: pair[0].as_ref(),
                second: pair[1].as_ref(),
            })
            .collect())
    }
}

/// Detector position from a position-bank word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Hex digits 6..8 of the token
    pub x: u8,
    /// Hex digits 8..10 of the token
    pub y: u8,
}

impl Position {
    /// Decode a `0x`-prefixed position token
    pub fn from_token(token: &str) -> Result<Self, DecodeError> {
        let malformed = |reason: &str| DecodeError::MalformedPosition {
            token: token.to_string(),
            reason: reason.to_string(),
        };

        let digits = hex_digits(token).map_err(|reason| malformed(&reason))?;
        let x = u8::from_str_radix(&digits[4..6], 16).map_err(|e| malformed(&e.to_string()))?;
        let y = u8::from_str_radix(&digits[6..8], 16).map_err(|e| malformed(&e.to_string()))?;
        Ok(Self { x, y })
    }
}

/// Stateless decoder from raw word pairs to typed events
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDecoder;

impl EventDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a full event bank.
    ///
    /// Decoding is 1:1 with word pairs and preserves order. The first
    /// malformed pair aborts decoding.
    pub fn decode<S: AsRef<str>>(&self, tokens: &[S]) -> Result<DecodedEvents, DecodeError> {
        let pairs = RawWordPair::pairs(tokens)?;
        let mut decoded = DecodedEvents {
            events: Vec::with_capacity(pairs.len()),
            anomalies: Vec::new(),
        };

        for (pair_index, pair) in pairs.iter().enumerate() {
            let event = self.decode_pair(pair_index, pair)?;
            if event.anomalous {
                decoded.anomalies.push(pair.first.to_string());
            }
            decoded.events.push(event);
        }

        if !decoded.anomalies.is_empty() {
            warn!(
                "{} event words used glitch type codes and were normalized",
                decoded.anomalies.len()
            );
        }
        debug!("Decoded {} events", decoded.events.len());

        Ok(decoded)
    }

    /// Decode a single word pair
    pub fn decode_pair(
        &self,
        pair_index: usize,
        pair: &RawWordPair<'_>,
    ) -> Result<DecodedEvent, DecodeError> {
        let malformed = |token: &str, reason: String| DecodeError::MalformedEvent {
            pair_index,
            token: token.to_string(),
            reason,
        };

        let head = hex_digits(pair.first).map_err(|reason| malformed(pair.first, reason))?;
        let tail = hex_digits(pair.second).map_err(|reason| malformed(pair.second, reason))?;

        let nibble = head.chars().next().unwrap_or('?');
        let (kind, anomalous) = EventKind::from_nibble(nibble)
            .ok_or_else(|| malformed(pair.first, format!("unknown event type '{}'", nibble)))?;

        let cycle = u16::from_str_radix(&head[1..4], 16)
            .map_err(|e| malformed(pair.first, e.to_string()))?;
        if cycle >= GATE_COUNTER_LIMIT {
            return Err(malformed(
                pair.first,
                format!("gate counter {:#x} is not below {:#x}", cycle, GATE_COUNTER_LIMIT),
            ));
        }
        let ticks =
            u32::from_str_radix(tail, 16).map_err(|e| malformed(pair.second, e.to_string()))?;

        Ok(DecodedEvent {
            event: Event::new(kind, cycle, f64::from(ticks) * TOF_TICK_US),
            anomalous,
        })
    }
}

/// Validate a raw token and return its 8 hex digits
fn hex_digits(token: &str) -> Result<&str, String> {
    if token.len() != TOKEN_WIDTH || !token.is_ascii() {
        return Err(format!(
            "expected {} ASCII characters, got {}",
            TOKEN_WIDTH,
            token.chars().count()
        ));
    }
    if !(token.starts_with("0x") || token.starts_with("0X")) {
        return Err("missing 0x prefix".to_string());
    }

    let digits = &token[2..];
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err("non-hexadecimal digit".to_string());
    }
    Ok(digits)
}
