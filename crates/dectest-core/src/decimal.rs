//! Decimal value model for corpus literals and engine results.
//!
//! A [`DecimalValue`] is the finite, infinite, or NaN value a decTest literal
//! denotes, kept digit-for-digit: `1.20` and `1.2` are different values here
//! because they carry different exponents. Nothing in this module performs
//! arithmetic; it exists so the oracle can compare sign, class, scale,
//! precision, and exact numeric value.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reasons a decimal literal is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum LiteralError {
    /// The text was empty.
    #[error("empty literal")]
    Empty,
    /// Neither an integer part nor a fraction contained a digit.
    #[error("literal has no digits")]
    MissingDigits,
    /// An exponent marker (and optional sign) was not followed by digits.
    #[error("exponent has no digits")]
    MissingExponentDigits,
    /// The exponent does not fit in a signed 64-bit integer.
    #[error("exponent out of range")]
    ExponentOverflow,
    /// An alphabetic token that is not `Inf`, `Infinity`, `NaN`, `qNaN`, or `sNaN`.
    #[error("unknown special value '{0}'")]
    UnknownSpecial(String),
    /// Characters were left over after a complete literal.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
}

/// Finiteness class of a decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ValueClass {
    /// Any finite value, zero included.
    Finite,
    /// Positive or negative infinity.
    Infinite,
    /// Quiet or signaling NaN.
    NaN,
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite => write!(f, "finite"),
            Self::Infinite => write!(f, "infinite"),
            Self::NaN => write!(f, "NaN"),
        }
    }
}

/// A decimal value as written in the corpus or returned by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DecimalValue {
    /// `(-1)^negative * coefficient * 10^exponent`.
    Finite {
        /// Sign bit.
        negative: bool,
        /// Coefficient digits without leading zeros (`"0"` for zero).
        coefficient: String,
        /// Power-of-ten exponent, also reported as the scale.
        exponent: i64,
    },
    /// Signed infinity.
    Infinite {
        /// Sign bit.
        negative: bool,
    },
    /// Quiet or signaling NaN with an optional diagnostic payload.
    NaN {
        /// Sign bit.
        negative: bool,
        /// Whether this is a signaling NaN.
        signaling: bool,
        /// Diagnostic digits without leading zeros (empty when absent).
        payload: String,
    },
}

impl DecimalValue {
    /// Builds a finite value from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`LiteralError::MissingDigits`] when `coefficient` is empty and
    /// [`LiteralError::UnexpectedCharacter`] when it holds a non-digit.
    pub fn from_parts(
        negative: bool,
        coefficient: &str,
        exponent: i64,
    ) -> Result<Self, LiteralError> {
        if coefficient.is_empty() {
            return Err(LiteralError::MissingDigits);
        }
        if let Some(bad) = coefficient.chars().find(|c| !c.is_ascii_digit()) {
            return Err(LiteralError::UnexpectedCharacter(bad));
        }
        Ok(Self::Finite {
            negative,
            coefficient: strip_leading_zeros(coefficient, "0"),
            exponent,
        })
    }

    /// Signed infinity.
    #[must_use]
    pub const fn infinity(negative: bool) -> Self {
        Self::Infinite { negative }
    }

    /// Quiet or signaling NaN without a payload.
    #[must_use]
    pub const fn nan(negative: bool, signaling: bool) -> Self {
        Self::NaN {
            negative,
            signaling,
            payload: String::new(),
        }
    }

    /// Returns the sign bit.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        match self {
            Self::Finite { negative, .. }
            | Self::Infinite { negative }
            | Self::NaN { negative, .. } => *negative,
        }
    }

    /// Returns the finiteness class.
    #[must_use]
    pub const fn class(&self) -> ValueClass {
        match self {
            Self::Finite { .. } => ValueClass::Finite,
            Self::Infinite { .. } => ValueClass::Infinite,
            Self::NaN { .. } => ValueClass::NaN,
        }
    }

    /// Returns true for signaling NaNs.
    #[must_use]
    pub const fn is_signaling(&self) -> bool {
        matches!(self, Self::NaN { signaling: true, .. })
    }

    /// Returns true for a finite zero of either sign.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Finite { coefficient, .. } if coefficient == "0")
    }

    /// Coefficient digits of a finite value.
    #[must_use]
    pub fn coefficient(&self) -> Option<&str> {
        match self {
            Self::Finite { coefficient, .. } => Some(coefficient),
            _ => None,
        }
    }

    /// Exponent of a finite value.
    #[must_use]
    pub const fn exponent(&self) -> Option<i64> {
        match self {
            Self::Finite { exponent, .. } => Some(*exponent),
            _ => None,
        }
    }

    /// Scale of a finite value as the corpus reports it: the exponent, so
    /// `2.0` has scale -1 and `1E+3` has scale 3.
    #[must_use]
    pub fn scale(&self) -> Option<i128> {
        self.exponent().map(i128::from)
    }

    /// Number of significant digits of a finite value; zero has precision 1.
    #[must_use]
    pub fn precision(&self) -> Option<usize> {
        self.coefficient().map(str::len)
    }

    /// Exact numeric comparison of two finite values, ignoring scale.
    ///
    /// Returns `None` when either side is not finite. Zeros of any exponent
    /// compare equal; the sign is not considered.
    #[must_use]
    pub fn numeric_eq(&self, other: &Self) -> Option<bool> {
        let (Self::Finite { .. }, Self::Finite { .. }) = (self, other) else {
            return None;
        };
        if self.is_zero() || other.is_zero() {
            return Some(self.is_zero() && other.is_zero());
        }
        Some(self.normalized() == other.normalized())
    }

    fn normalized(&self) -> Option<(&str, i128)> {
        let Self::Finite {
            coefficient,
            exponent,
            ..
        } = self
        else {
            return None;
        };
        let trimmed = coefficient.trim_end_matches('0');
        let dropped = coefficient.len() - trimmed.len();
        Some((trimmed, i128::from(*exponent) + dropped as i128))
    }
}

impl FromStr for DecimalValue {
    type Err = LiteralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, end) = scan_literal(s.as_bytes(), 0)?;
        match s[end..].chars().next() {
            Some(c) => Err(LiteralError::UnexpectedCharacter(c)),
            None => Ok(value),
        }
    }
}

/// Renders the to-scientific-string form.
impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        match self {
            Self::Infinite { .. } => f.write_str("Infinity"),
            Self::NaN {
                signaling, payload, ..
            } => {
                if *signaling {
                    f.write_str("s")?;
                }
                write!(f, "NaN{payload}")
            }
            Self::Finite {
                coefficient,
                exponent,
                ..
            } => write_scientific(f, coefficient, *exponent),
        }
    }
}

fn write_scientific(f: &mut fmt::Formatter<'_>, coefficient: &str, exponent: i64) -> fmt::Result {
    let digits = coefficient.len() as i128;
    let exponent = i128::from(exponent);
    let adjusted = exponent + digits - 1;

    if exponent > 0 || adjusted < -6 {
        let (lead, rest) = coefficient.split_at(1);
        f.write_str(lead)?;
        if !rest.is_empty() {
            write!(f, ".{rest}")?;
        }
        let sign = if adjusted >= 0 { "+" } else { "" };
        return write!(f, "E{sign}{adjusted}");
    }

    if exponent == 0 {
        return f.write_str(coefficient);
    }

    let point = digits + exponent;
    if point > 0 {
        let (int, frac) = coefficient.split_at(usize::try_from(point).unwrap_or(0));
        write!(f, "{int}.{frac}")
    } else {
        let zeros = usize::try_from(-point).unwrap_or(0);
        write!(f, "0.{}{coefficient}", "0".repeat(zeros))
    }
}

/// Scans one decimal literal or special value starting at `start`.
///
/// Accepts an optional sign, then either digits with an optional fraction and
/// exponent, or one of `Inf`, `Infinity`, `NaN`, `qNaN`, `sNaN` (any case)
/// where NaNs may carry trailing payload digits. Returns the value and the
/// index one past the last consumed byte; the caller decides what may follow.
///
/// # Errors
///
/// Returns a [`LiteralError`] describing the first malformed part.
pub fn scan_literal(bytes: &[u8], start: usize) -> Result<(DecimalValue, usize), LiteralError> {
    let mut pos = start;
    let negative = match bytes.get(pos) {
        None => return Err(LiteralError::Empty),
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        Some(_) => false,
    };

    if bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
        return scan_special(bytes, pos, negative);
    }

    let int_start = pos;
    pos = skip_digits(bytes, pos);
    let int_digits = &bytes[int_start..pos];

    let mut frac_digits: &[u8] = &[];
    if bytes.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        pos = skip_digits(bytes, frac_start);
        frac_digits = &bytes[frac_start..pos];
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err(LiteralError::MissingDigits);
    }

    let mut written_exponent: i64 = 0;
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        let exponent_negative = match bytes.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };
        let exp_start = pos;
        pos = skip_digits(bytes, exp_start);
        if pos == exp_start {
            return Err(LiteralError::MissingExponentDigits);
        }
        written_exponent = accumulate_exponent(&bytes[exp_start..pos], exponent_negative)?;
    }

    let frac_len = i64::try_from(frac_digits.len()).map_err(|_| LiteralError::ExponentOverflow)?;
    let exponent = written_exponent
        .checked_sub(frac_len)
        .ok_or(LiteralError::ExponentOverflow)?;

    let mut coefficient = String::with_capacity(int_digits.len() + frac_digits.len());
    coefficient.extend(int_digits.iter().map(|&b| char::from(b)));
    coefficient.extend(frac_digits.iter().map(|&b| char::from(b)));

    Ok((
        DecimalValue::Finite {
            negative,
            coefficient: strip_leading_zeros(&coefficient, "0"),
            exponent,
        },
        pos,
    ))
}

fn scan_special(
    bytes: &[u8],
    start: usize,
    negative: bool,
) -> Result<(DecimalValue, usize), LiteralError> {
    let mut pos = start;
    while bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
        pos += 1;
    }
    let word = String::from_utf8_lossy(&bytes[start..pos]).to_ascii_lowercase();

    match word.as_str() {
        "inf" | "infinity" => Ok((DecimalValue::Infinite { negative }, pos)),
        "nan" | "qnan" | "snan" => {
            let payload_start = pos;
            pos = skip_digits(bytes, pos);
            let payload = String::from_utf8_lossy(&bytes[payload_start..pos]);
            Ok((
                DecimalValue::NaN {
                    negative,
                    signaling: word == "snan",
                    payload: strip_leading_zeros(&payload, ""),
                },
                pos,
            ))
        }
        _ => Err(LiteralError::UnknownSpecial(
            String::from_utf8_lossy(&bytes[start..pos]).into_owned(),
        )),
    }
}

fn skip_digits(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    pos
}

fn accumulate_exponent(digits: &[u8], negative: bool) -> Result<i64, LiteralError> {
    let mut value: i64 = 0;
    for &digit in digits {
        let d = i64::from(digit - b'0');
        value = value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(d) } else { v.checked_add(d) })
            .ok_or(LiteralError::ExponentOverflow)?;
    }
    Ok(value)
}

fn strip_leading_zeros(digits: &str, empty: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        empty.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{DecimalValue, LiteralError, ValueClass};

    fn parse(text: &str) -> DecimalValue {
        text.parse().expect("valid literal")
    }

    #[rstest]
    #[case("2", 0, 1)]
    #[case("2.0", -1, 2)]
    #[case("0.00", -2, 1)]
    #[case("-12.345", -3, 5)]
    #[case("1E+3", 3, 1)]
    #[case("1.20e-5", -7, 3)]
    #[case(".5", -1, 1)]
    #[case("5.", 0, 1)]
    #[case("000123", 0, 3)]
    fn finite_literals_keep_scale_and_precision(
        #[case] text: &str,
        #[case] scale: i128,
        #[case] precision: usize,
    ) {
        let value = parse(text);
        assert_eq!(value.class(), ValueClass::Finite);
        assert_eq!(value.scale(), Some(scale));
        assert_eq!(value.precision(), Some(precision));
    }

    #[rstest]
    #[case("Inf", ValueClass::Infinite, false)]
    #[case("-Infinity", ValueClass::Infinite, true)]
    #[case("+inf", ValueClass::Infinite, false)]
    #[case("NaN", ValueClass::NaN, false)]
    #[case("-nan", ValueClass::NaN, true)]
    #[case("qNaN", ValueClass::NaN, false)]
    #[case("-sNaN123", ValueClass::NaN, true)]
    fn specials_are_case_insensitive(
        #[case] text: &str,
        #[case] class: ValueClass,
        #[case] negative: bool,
    ) {
        let value = parse(text);
        assert_eq!(value.class(), class);
        assert_eq!(value.is_negative(), negative);
    }

    #[test]
    fn snan_payload_is_kept_without_leading_zeros() {
        assert_eq!(
            parse("sNaN0012"),
            DecimalValue::NaN {
                negative: false,
                signaling: true,
                payload: "12".to_string(),
            }
        );
    }

    #[rstest]
    #[case("", LiteralError::Empty)]
    #[case("-", LiteralError::MissingDigits)]
    #[case(".", LiteralError::MissingDigits)]
    #[case("1E", LiteralError::MissingExponentDigits)]
    #[case("1e+", LiteralError::MissingExponentDigits)]
    #[case("1E99999999999999999999", LiteralError::ExponentOverflow)]
    #[case("Infinite", LiteralError::UnknownSpecial("Infinite".to_string()))]
    #[case("1.2.3", LiteralError::UnexpectedCharacter('.'))]
    #[case("Inf1", LiteralError::UnexpectedCharacter('1'))]
    fn malformed_literals_are_rejected(#[case] text: &str, #[case] expected: LiteralError) {
        assert_eq!(text.parse::<DecimalValue>(), Err(expected));
    }

    #[test]
    fn numeric_equality_ignores_scale() {
        assert_eq!(parse("2").numeric_eq(&parse("2.000")), Some(true));
        assert_eq!(parse("0E+5").numeric_eq(&parse("0.00")), Some(true));
        assert_eq!(parse("12E-1").numeric_eq(&parse("1.2")), Some(true));
        assert_eq!(parse("1.21").numeric_eq(&parse("1.2")), Some(false));
        assert_eq!(parse("0").numeric_eq(&parse("1E-999")), Some(false));
        assert_eq!(parse("Inf").numeric_eq(&parse("1")), None);
    }

    #[rstest]
    #[case("0", "0")]
    #[case("-0.00", "-0.00")]
    #[case("123.45", "123.45")]
    #[case("1E+3", "1E+3")]
    #[case("12.3E+5", "1.23E+6")]
    #[case("0.000001", "0.000001")]
    #[case("0.0000001", "1E-7")]
    #[case("0E-8", "0E-8")]
    #[case("-Inf", "-Infinity")]
    #[case("snan7", "sNaN7")]
    #[case("-qNaN", "-NaN")]
    fn display_is_scientific_string(#[case] text: &str, #[case] rendered: &str) {
        assert_eq!(parse(text).to_string(), rendered);
    }

    #[test]
    fn from_parts_rejects_non_digits() {
        assert_eq!(
            DecimalValue::from_parts(false, "12a", 0),
            Err(LiteralError::UnexpectedCharacter('a'))
        );
        assert_eq!(
            DecimalValue::from_parts(true, "0042", -1).map(|v| v.to_string()),
            Ok("-4.2".to_string())
        );
    }
}
