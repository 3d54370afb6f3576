//! # Excitation Frequency List
//!
//! The EVA frequency table holds one frequency per excitation step. When
//! the run used a quadrupole frequency list (`Quad FreqList`), it is a
//! `;`-separated list of `(center, halfwidth, steps)` triples:
//!
//! ```text
//! (1234567.8, 5.0, 21); (1234600.0, 2.5, 11)
//! ```
//!
//! Each triple expands to `steps` frequencies from `center - halfwidth` to
//! `center + halfwidth` in equal increments. Without a list, the table is a
//! uniform ramp from the start to the stop frequency.
//!
//! Under [`FrequencyListPolicy::Lenient`] the parentheses are optional, so
//! a single bare `100.0, 10.0, 3` is a valid list. An empty entry, such as
//! the one left by a trailing `;`, is invalid under either policy.

use log::{debug, warn};

use crate::metadata::ExperimentMetadata;

/// Errors from the explicit frequency-list grammar
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrequencyListError {
    /// A chunk is not a triple of numbers
    #[error("Frequency list entry {index} ({chunk:?}) is not a (center, halfwidth, steps) triple")]
    InvalidEntry {
        /// Entry index (0-based)
        index: usize,
        /// Raw text of the entry
        chunk: String,
    },

    /// A triple asks for fewer than two steps, which has no step size
    #[error("Frequency list entry {index} has {steps} steps; at least 2 are required")]
    TooFewSteps {
        /// Entry index (0-based)
        index: usize,
        /// Step count found
        steps: u32,
    },

    /// The list text holds no entries
    #[error("Frequency list is empty")]
    Empty,
}

/// One `(center, halfwidth, steps)` entry of a frequency list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencySweep {
    /// Center frequency (Hz)
    pub center: f64,
    /// Half of the swept range (Hz)
    pub halfwidth: f64,
    /// Number of frequencies in the sweep
    pub steps: u32,
}

impl FrequencySweep {
    /// Expand into `steps` ascending frequencies
    pub fn expand(&self) -> impl Iterator<Item = f64> + '_ {
        let df = 2.0 * self.halfwidth / (f64::from(self.steps) - 1.0);
        (0..self.steps).map(move |i| self.center - self.halfwidth + f64::from(i) * df)
    }
}

/// Parse a `Quad FreqList` value into its sweeps.
///
/// [`FrequencyListPolicy::Strict`] requires every triple to be wrapped in
/// `(...)` or `[...]`; the lenient policy also takes bare triples.
pub fn parse_frequency_list(
    text: &str,
    policy: FrequencyListPolicy,
) -> Result<Vec<FrequencySweep>, FrequencyListError> {
    if text.trim().is_empty() {
        return Err(FrequencyListError::Empty);
    }

    text.split(';')
        .map(str::trim)
        .enumerate()
        .map(|(index, chunk)| parse_sweep(index, chunk, policy))
        .collect()
}

fn parse_sweep(
    index: usize,
    chunk: &str,
    policy: FrequencyListPolicy,
) -> Result<FrequencySweep, FrequencyListError> {
    let invalid = || FrequencyListError::InvalidEntry {
        index,
        chunk: chunk.to_string(),
    };

    let bracketed = chunk
        .strip_prefix(['(', '['])
        .and_then(|rest| rest.strip_suffix([')', ']']));
    let inner = match (bracketed, policy) {
        (Some(inner), _) => inner,
        (None, FrequencyListPolicy::Lenient) if !chunk.is_empty() => chunk,
        (None, _) => return Err(invalid()),
    };

    let fields: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [center, halfwidth, steps] = fields.as_slice() else {
        return Err(invalid());
    };

    let center: f64 = center.parse().map_err(|_| invalid())?;
    let halfwidth: f64 = halfwidth.parse().map_err(|_| invalid())?;
    let steps = parse_step_count(steps).ok_or_else(invalid)?;

    if !center.is_finite() || !halfwidth.is_finite() {
        return Err(invalid());
    }
    if steps < 2 {
        return Err(FrequencyListError::TooFewSteps { index, steps });
    }

    Ok(FrequencySweep {
        center,
        halfwidth,
        steps,
    })
}

/// Step counts are integral, but ODB values are often written as `21.0`
fn parse_step_count(text: &str) -> Option<u32> {
    if let Ok(steps) = text.parse::<u32>() {
        return Some(steps);
    }
    let value: f64 = text.parse().ok()?;
    if value.fract() == 0.0 && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

/// Uniform ramp of `steps` frequencies from `start` to `stop`, inclusive
pub fn frequency_ramp(start: f64, stop: f64, steps: u32) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let df = (stop - start) / (f64::from(steps) - 1.0);
            (0..steps).map(|i| start + f64::from(i) * df).collect()
        }
    }
}

/// How an unparsable frequency list is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyListPolicy {
    /// Accept bare triples; warn and fall back to the start/stop ramp on
    /// any parse failure
    #[default]
    Lenient,
    /// Require bracketed triples and surface the parse error
    Strict,
}

/// Derives the excitation frequency table from run metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyListBuilder {
    policy: FrequencyListPolicy,
}

impl FrequencyListBuilder {
    /// Create a builder with the given parse policy
    pub fn new(policy: FrequencyListPolicy) -> Self {
        Self { policy }
    }

    /// Build the frequency table.
    ///
    /// The caller is responsible for the table length matching
    /// `num_freq_steps`; a mismatch is only logged.
    pub fn build(&self, metadata: &ExperimentMetadata) -> Result<Vec<f64>, FrequencyListError> {
        let ramp = || {
            frequency_ramp(
                metadata.start_freq_hz,
                metadata.stop_freq_hz,
                metadata.num_freq_steps,
            )
        };

        let frequencies = match metadata.quad_freq_list.as_deref() {
            None => ramp(),
            Some(text) => match parse_frequency_list(text, self.policy) {
                Ok(sweeps) => {
                    debug!("Using quad frequency list with {} sweeps", sweeps.len());
                    sweeps.iter().flat_map(FrequencySweep::expand).collect()
                }
                Err(err) if self.policy == FrequencyListPolicy::Lenient => {
                    warn!("Ignoring quad frequency list ({}); using the start/stop ramp", err);
                    ramp()
                }
                Err(err) => return Err(err),
            },
        };

        if frequencies.len() != metadata.num_freq_steps as usize {
            warn!(
                "Frequency list has {} entries but the run declares {} frequency steps",
                frequencies.len(),
                metadata.num_freq_steps
            );
        }

        Ok(frequencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(quad_freq_list: Option<&str>) -> ExperimentMetadata {
        ExperimentMetadata {
            start_freq_hz: 1_000_000.0,
            stop_freq_hz: 2_000_000.0,
            num_freq_steps: 3,
            quad_freq_list: quad_freq_list.map(str::to_string),
            ..ExperimentMetadata::default()
        }
    }

    #[test]
    fn test_ramp_without_list() {
        let freqs = FrequencyListBuilder::default().build(&metadata(None)).unwrap();
        assert_eq!(freqs, vec![1_000_000.0, 1_500_000.0, 2_000_000.0]);
    }

    #[test]
    fn test_ramp_edge_cases() {
        assert!(frequency_ramp(1.0, 2.0, 0).is_empty());
        assert_eq!(frequency_ramp(1.0, 2.0, 1), vec![1.0]);
    }

    #[test]
    fn test_quad_list_expansion() {
        let freqs = FrequencyListBuilder::default()
            .build(&metadata(Some("(100.0, 10.0, 3); (200, 1, 2)")))
            .unwrap();
        assert_eq!(freqs, vec![90.0, 100.0, 110.0, 199.0, 201.0]);
    }

    #[test]
    fn test_parse_accepts_float_step_counts() {
        let sweeps = parse_frequency_list("(1e6, 5.0, 21.0)", FrequencyListPolicy::Strict).unwrap();
        assert_eq!(sweeps.len(), 1);
        assert_eq!(sweeps[0].steps, 21);
        assert_eq!(sweeps[0].center, 1e6);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        for policy in [FrequencyListPolicy::Lenient, FrequencyListPolicy::Strict] {
            assert!(matches!(
                parse_frequency_list("(1, 2)", policy),
                Err(FrequencyListError::InvalidEntry { index: 0, .. })
            ));
            assert!(matches!(
                parse_frequency_list("(1, 2, 1)", policy),
                Err(FrequencyListError::TooFewSteps { steps: 1, .. })
            ));
            assert!(matches!(
                parse_frequency_list("(1, 2, 3); ", policy),
                Err(FrequencyListError::InvalidEntry { index: 1, .. })
            ));
            assert_eq!(
                parse_frequency_list("  ", policy),
                Err(FrequencyListError::Empty)
            );
        }
        assert!(matches!(
            parse_frequency_list("(1, 2, 3); 4, 5, 6", FrequencyListPolicy::Strict),
            Err(FrequencyListError::InvalidEntry { index: 1, .. })
        ));
    }

    #[test]
    fn test_lenient_parse_accepts_bare_triples() {
        let sweeps =
            parse_frequency_list("(1, 2, 3); 4, 5, 6", FrequencyListPolicy::Lenient).unwrap();
        assert_eq!(sweeps[1].center, 4.0);
        assert_eq!(sweeps[1].steps, 6);

        let freqs = FrequencyListBuilder::default()
            .build(&metadata(Some("100, 10, 3")))
            .unwrap();
        assert_eq!(freqs, vec![90.0, 100.0, 110.0]);
    }

    #[test]
    fn test_trailing_separator_falls_back_to_ramp() {
        let freqs = FrequencyListBuilder::default()
            .build(&metadata(Some("(100,10,3);")))
            .unwrap();
        assert_eq!(freqs, vec![1_000_000.0, 1_500_000.0, 2_000_000.0]);
    }

    #[test]
    fn test_lenient_policy_falls_back_to_ramp() {
        let freqs = FrequencyListBuilder::new(FrequencyListPolicy::Lenient)
            .build(&metadata(Some("garbage")))
            .unwrap();
        assert_eq!(freqs, vec![1_000_000.0, 1_500_000.0, 2_000_000.0]);
    }

    #[test]
    fn test_strict_policy_surfaces_error() {
        let result = FrequencyListBuilder::new(FrequencyListPolicy::Strict)
            .build(&metadata(Some("garbage")));
        assert!(result.is_err());
    }
}
