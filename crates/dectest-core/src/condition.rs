//! Condition flags and the corpus keyword vocabulary for them.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use thiserror::Error;

/// A set of decimal conditions, one bit per named flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Condition(u32);

/// Error for a condition keyword outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown condition '{0}'")]
pub struct UnknownCondition(pub String);

/// Rendering of the empty set.
pub const NO_CONDITIONS: &str = "NoConditions";

impl Condition {
    /// The empty set.
    pub const NONE: Self = Self(0);
    /// Exponent adjusted to fit the representable range.
    pub const CLAMPED: Self = Self(1 << 0);
    /// String was not a valid number.
    pub const CONVERSION_SYNTAX: Self = Self(1 << 1);
    /// Finite dividend divided by zero.
    pub const DIVISION_BY_ZERO: Self = Self(1 << 2);
    /// Integer quotient too large for the precision.
    pub const DIVISION_IMPOSSIBLE: Self = Self(1 << 3);
    /// Zero divided by zero.
    pub const DIVISION_UNDEFINED: Self = Self(1 << 4);
    /// Non-zero digits were discarded.
    pub const INEXACT: Self = Self(1 << 5);
    /// Engine ran out of working storage.
    pub const INSUFFICIENT_STORAGE: Self = Self(1 << 6);
    /// Context settings were outside the supported range.
    pub const INVALID_CONTEXT: Self = Self(1 << 7);
    /// Operation has no defined result.
    pub const INVALID_OPERATION: Self = Self(1 << 8);
    /// Result exponent exceeded the maximum.
    pub const OVERFLOW: Self = Self(1 << 9);
    /// Digits (zero or not) were discarded.
    pub const ROUNDED: Self = Self(1 << 10);
    /// Result is subnormal.
    pub const SUBNORMAL: Self = Self(1 << 11);
    /// Result is subnormal and inexact.
    pub const UNDERFLOW: Self = Self(1 << 12);
    /// Operand had more digits than the precision (`extended: 0` only).
    pub const LOST_DIGITS: Self = Self(1 << 13);

    /// Creates a set from raw bits; bits without a name are preserved.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true for the empty set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true when every flag of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Flags of `self` that are not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Iterates over the single-bit flags of the set, lowest bit first.
    pub fn iter(self) -> impl Iterator<Item = Self> {
        (0..u32::BITS)
            .map(|shift| Self(1 << shift))
            .filter(move |bit| self.contains(*bit))
    }

    /// Returns the corpus keyword of a single named flag.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        CONDITION_NAMES
            .iter()
            .find(|(_, condition)| *condition == self)
            .map(|(name, _)| *name)
    }

    /// Resolves a corpus keyword such as `Division_by_zero`.
    ///
    /// Matching is ASCII case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCondition`] for a keyword outside the vocabulary.
    pub fn from_name(name: &str) -> Result<Self, UnknownCondition> {
        CONDITION_NAMES
            .iter()
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case(name))
            .map(|(_, condition)| *condition)
            .ok_or_else(|| UnknownCondition(name.to_string()))
    }
}

/// Corpus keywords in bit order.
pub const CONDITION_NAMES: &[(&str, Condition)] = &[
    ("Clamped", Condition::CLAMPED),
    ("Conversion_syntax", Condition::CONVERSION_SYNTAX),
    ("Division_by_zero", Condition::DIVISION_BY_ZERO),
    ("Division_impossible", Condition::DIVISION_IMPOSSIBLE),
    ("Division_undefined", Condition::DIVISION_UNDEFINED),
    ("Inexact", Condition::INEXACT),
    ("Insufficient_storage", Condition::INSUFFICIENT_STORAGE),
    ("Invalid_context", Condition::INVALID_CONTEXT),
    ("Invalid_operation", Condition::INVALID_OPERATION),
    ("Overflow", Condition::OVERFLOW),
    ("Rounded", Condition::ROUNDED),
    ("Subnormal", Condition::SUBNORMAL),
    ("Underflow", Condition::UNDERFLOW),
    ("Lost_digits", Condition::LOST_DIGITS),
];

impl BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Condition {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl FromIterator<Self> for Condition {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::union)
    }
}

/// Renders keywords joined by `", "`, or [`NO_CONDITIONS`] for the empty set.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(NO_CONDITIONS);
        }
        for (idx, bit) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            match bit.name() {
                Some(name) => f.write_str(name)?,
                None => write!(f, "unknown({})", bit.0)?,
            }
        }
        Ok(())
    }
}

/// Parses the rendered form back into a set.
impl FromStr for Condition {
    type Err = UnknownCondition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == NO_CONDITIONS {
            return Ok(Self::NONE);
        }
        s.split(',')
            .map(|part| {
                let part = part.trim();
                parse_unknown_bit(part).map_or_else(|| Self::from_name(part), Ok)
            })
            .collect()
    }
}

fn parse_unknown_bit(part: &str) -> Option<Condition> {
    let bits = part.strip_prefix("unknown(")?.strip_suffix(')')?;
    bits.parse::<u32>()
        .ok()
        .filter(|b| b.count_ones() == 1)
        .map(Condition)
}
