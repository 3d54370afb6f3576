//! Float text as the EVA header has always carried it: twelve significant
//! digits, trailing zeros removed, and a `.0` suffix on integral values.

const SIGNIFICANT_DIGITS: i32 = 12;

/// Format a float for an EVA header field.
///
/// ```
/// use midas2eva::eva::header_float;
///
/// assert_eq!(header_float(500000.0), "500000.0");
/// assert_eq!(header_float(0.1), "0.1");
/// assert_eq!(header_float(1.0 / 3.0), "0.333333333333");
/// assert_eq!(header_float(1e-5), "1e-05");
/// assert_eq!(header_float(2.5e14), "2.5e+14");
/// ```
pub fn header_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // The decimal exponent after rounding to the significant digits picks
    // between fixed and scientific notation.
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        let fixed = format!("{:.*}", decimals, value);
        let mut text = trim_fraction(&fixed).to_string();
        if !text.contains('.') {
            text.push_str(".0");
        }
        text
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
