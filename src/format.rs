use std::fmt::Display;

/// Fraction digits kept when displaying a result.
pub const FRACTION_DIGITS: usize = 10;

/// Smallest subnormal is 2^-1074, so this many fraction digits print any
/// `f64` exactly.
const EXACT_DIGITS: usize = 1074;

/// A successful evaluation whose value is not a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericAnomaly {
    /// Positive or negative infinity.
    Overflow,
    NotANumber,
}

impl NumericAnomaly {
    pub fn classify(value: f64) -> Option<Self> {
        if value.is_nan() {
            Some(NumericAnomaly::NotANumber)
        } else if value.is_infinite() {
            Some(NumericAnomaly::Overflow)
        } else {
            None
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            NumericAnomaly::Overflow => "Operation too large.",
            NumericAnomaly::NotANumber => "divide by 0.",
        }
    }

    pub fn note(self) -> Option<&'static str> {
        match self {
            NumericAnomaly::Overflow => Some("may be because of division by 0."),
            NumericAnomaly::NotANumber => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub display: String,
    pub anomaly: Option<NumericAnomaly>,
}

impl Evaluation {
    pub fn from_value(value: f64) -> Self {
        Evaluation {
            value,
            display: format_value(value),
            anomaly: NumericAnomaly::classify(value),
        }
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.anomaly {
            None => write!(f, "{}", self.display),
            Some(anomaly) => {
                writeln!(f, "Error: {}", anomaly.message())?;
                if let Some(note) = anomaly.note() {
                    writeln!(f, "       Note: {note}")?;
                }
                write!(f, "Result: {}", self.display)
            }
        }
    }
}

/// Formats like the `#.##########` decimal pattern: at most ten fraction
/// digits, rounded half-up, trailing zeros dropped.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    round_half_up(value, FRACTION_DIGITS)
}

/// Rounds on the exact decimal expansion of `value`, so a tie is decided by
/// the stored binary value and never by an earlier shortest-repr rounding.
/// Large integers print every exact digit: 2^70 is 1180591620717411303424,
/// not the zero-padded shortest repr 1180591620717411300000.
fn round_half_up(value: f64, places: usize) -> String {
    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(places))
        .map(|b| b - b'0')
        .collect();

    let round_up = frac_part
        .as_bytes()
        .get(places)
        .is_some_and(|&d| d >= b'5');
    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - places;
    let (int_digits, frac_digits) = digits.split_at(split);
    let frac_len = frac_digits
        .iter()
        .rposition(|&d| d != 0)
        .map_or(0, |last| last + 1);

    let mut out = String::with_capacity(split + frac_len + 2);
    if value.is_sign_negative() && digits.iter().any(|&d| d != 0) {
        out.push('-');
    }
    let first_significant = int_digits
        .iter()
        .position(|&d| d != 0)
        .unwrap_or(int_digits.len().saturating_sub(1));
    out.extend(int_digits[first_significant..].iter().map(|&d| char::from(b'0' + d)));
    if frac_len > 0 {
        out.push('.');
        out.extend(frac_digits[..frac_len].iter().map(|&d| char::from(b'0' + d)));
    }
    out
}
