//! Operand and result tokens as written on a case line.

use std::fmt;

/// Sign and signaling class of a NaN token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NanKind {
    /// Token carried a leading `-`.
    pub negative: bool,
    /// Token was `sNaN` rather than `NaN`/`qNaN`.
    pub signaling: bool,
}

/// A single operand or result token.
///
/// The text is opaque: it is kept exactly as written (minus enclosing quotes)
/// and only interpreted on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Datum {
    text: String,
    quote: Option<char>,
}

impl Datum {
    /// An unquoted token.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quote: None,
        }
    }

    /// A quoted token; `contents` is the unescaped text between the quotes.
    #[must_use]
    pub fn quoted(contents: impl Into<String>, quote: char) -> Self {
        Self {
            text: contents.into(),
            quote: Some(quote),
        }
    }

    /// The text with enclosing quotes stripped.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        &self.text
    }

    /// Whether the token was quoted in the corpus.
    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        self.quote.is_some()
    }

    /// Whether the token is a `#` null reference or fixed-width encoding.
    #[must_use]
    pub fn is_encoded(&self) -> bool {
        !self.is_quoted() && self.text.starts_with('#')
    }

    /// Detects `NaN`, `qNaN`, and `sNaN` (any case, optional sign, optional
    /// payload digits).
    #[must_use]
    pub fn nan(&self) -> Option<NanKind> {
        let (negative, body) = split_sign(&self.text);
        let lower = body.to_ascii_lowercase();
        let word = lower.trim_end_matches(|c: char| c.is_ascii_digit());
        let signaling = match word {
            "nan" | "qnan" => false,
            "snan" => true,
            _ => return None,
        };
        Some(NanKind {
            negative,
            signaling,
        })
    }

    /// Detects `Inf` and `Infinity` (any case, optional sign) and returns
    /// whether it is negative.
    #[must_use]
    pub fn infinity(&self) -> Option<bool> {
        let (negative, body) = split_sign(&self.text);
        (body.eq_ignore_ascii_case("inf") || body.eq_ignore_ascii_case("infinity"))
            .then_some(negative)
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    text.strip_prefix('-').map_or_else(
        || (false, text.strip_prefix('+').unwrap_or(text)),
        |rest| (true, rest),
    )
}

/// Renders the token as it would appear on a case line.
impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote {
            None => f.write_str(&self.text),
            Some(q) => {
                let mut doubled = String::with_capacity(2);
                doubled.push(q);
                doubled.push(q);
                write!(f, "{q}{}{q}", self.text.replace(q, &doubled))
            }
        }
    }
}

impl PartialEq<str> for Datum {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Datum {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}
