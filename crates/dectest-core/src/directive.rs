//! Directive lines and the per-file context they mutate.
//!
//! A decTest file sets its arithmetic context with lines such as
//! `precision: 9` or `rounding: half_even`. [`DirectiveTracker`] absorbs those
//! lines in file order and hands out owned [`DirectiveState`] snapshots so a
//! parsed case keeps the context it was written under.
//!
//! ## Recognized keywords
//!
//! - `precision: N` (N >= 1)
//! - `maxexponent: N`, `minexponent: N`
//! - `clamp: 0|1`, `extended: 0|1`
//! - `rounding: <mode>`
//! - `version: <text>`
//! - `dectest: <name>` (include request, no state change)
//!
//! Keywords are case-insensitive and a trailing `--` comment is ignored.

use std::fmt;

use thiserror::Error;

/// Rounding modes named by the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RoundingMode {
    /// Round toward +Infinity.
    Ceiling,
    /// Round toward zero (truncate).
    Down,
    /// Round toward -Infinity.
    Floor,
    /// Round to nearest, ties toward zero.
    HalfDown,
    /// Round to nearest, ties to even.
    HalfEven,
    /// Round to nearest, ties away from zero.
    HalfUp,
    /// Round away from zero.
    Up,
    /// Round toward zero unless the last digit would be 0 or 5.
    ZeroFiveUp,
}

impl RoundingMode {
    /// Every mode in the vocabulary.
    pub const ALL: [Self; 8] = [
        Self::Ceiling,
        Self::Down,
        Self::Floor,
        Self::HalfDown,
        Self::HalfEven,
        Self::HalfUp,
        Self::Up,
        Self::ZeroFiveUp,
    ];

    /// The corpus token for this mode.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Ceiling => "ceiling",
            Self::Down => "down",
            Self::Floor => "floor",
            Self::HalfDown => "half_down",
            Self::HalfEven => "half_even",
            Self::HalfUp => "half_up",
            Self::Up => "up",
            Self::ZeroFiveUp => "05up",
        }
    }

    /// Resolves a corpus token (ASCII case-insensitive).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Rounding modes a tracker treats as implemented unless configured otherwise.
pub const DEFAULT_SUPPORTED_ROUNDING: [RoundingMode; 5] = [
    RoundingMode::Ceiling,
    RoundingMode::Down,
    RoundingMode::Floor,
    RoundingMode::HalfEven,
    RoundingMode::HalfUp,
];

/// The rounding setting of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Rounding {
    /// A mode the engine under test implements.
    Supported(RoundingMode),
    /// A recognized mode the engine does not implement; cases under it are
    /// skip-worthy.
    Unsupported(RoundingMode),
    /// A token outside the vocabulary; cases under it are skip-worthy.
    Unrecognized,
}

impl Rounding {
    /// The named mode regardless of support; `None` for an unrecognized
    /// token.
    #[must_use]
    pub const fn mode(self) -> Option<RoundingMode> {
        match self {
            Self::Supported(mode) | Self::Unsupported(mode) => Some(mode),
            Self::Unrecognized => None,
        }
    }

    /// Whether the mode is implemented.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supported(mode) => write!(f, "{mode}"),
            Self::Unsupported(mode) => write!(f, "{mode} (unsupported)"),
            Self::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Ambient arithmetic context for the cases of one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DirectiveState {
    /// Working precision in digits (at least 1).
    pub precision: u32,
    /// Rounding mode, or the latch for an unsupported one.
    pub rounding: Rounding,
    /// Largest adjusted exponent.
    pub max_exponent: i64,
    /// Smallest adjusted exponent of a normal number.
    pub min_exponent: i64,
    /// IEEE clamping of the exponent at the top of the range.
    pub clamp: bool,
    /// Extended (IEEE 754) arithmetic rather than the X3.274 subset.
    pub extended: bool,
    /// Corpus version string, if declared.
    pub version: Option<String>,
}

impl Default for DirectiveState {
    fn default() -> Self {
        Self {
            precision: 9,
            rounding: Rounding::Supported(RoundingMode::HalfUp),
            max_exponent: 999,
            min_exponent: -999,
            clamp: false,
            extended: true,
            version: None,
        }
    }
}

impl DirectiveState {
    /// Whether cases under this context should be skipped because the
    /// rounding mode is not implemented.
    #[must_use]
    pub const fn is_skip_worthy(&self) -> bool {
        !self.rounding.is_supported()
    }
}

/// A directive line that was absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Directive {
    /// `precision: N`.
    Precision(u32),
    /// `rounding: <mode>`, resolved against the supported set.
    Rounding(Rounding),
    /// `rounding: <token>` naming no known mode; latches
    /// [`Rounding::Unrecognized`].
    UnrecognizedRounding(String),
    /// `maxexponent: N`.
    MaxExponent(i64),
    /// `minexponent: N`.
    MinExponent(i64),
    /// `clamp: 0|1`.
    Clamp(bool),
    /// `extended: 0|1`.
    Extended(bool),
    /// `version: <text>`.
    Version(String),
    /// `dectest: <name>`; the caller decides how to resolve the include.
    Include(String),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precision(p) => write!(f, "precision: {p}"),
            Self::Rounding(r) => match r.mode() {
                Some(mode) => write!(f, "rounding: {mode}"),
                None => write!(f, "rounding: {r}"),
            },
            Self::UnrecognizedRounding(token) => write!(f, "rounding: {token}"),
            Self::MaxExponent(e) => write!(f, "maxexponent: {e}"),
            Self::MinExponent(e) => write!(f, "minexponent: {e}"),
            Self::Clamp(c) => write!(f, "clamp: {}", u8::from(*c)),
            Self::Extended(x) => write!(f, "extended: {}", u8::from(*x)),
            Self::Version(v) => write!(f, "version: {v}"),
            Self::Include(name) => write!(f, "dectest: {name}"),
        }
    }
}

/// A recognized directive keyword with an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// The value does not parse or is out of range for the keyword.
    #[error("invalid value for {keyword}: '{value}'")]
    InvalidValue {
        /// Directive keyword, lowercase.
        keyword: &'static str,
        /// Value text as written.
        value: String,
    },
}

/// Tracks directive state for one corpus file.
#[derive(Debug, Clone)]
pub struct DirectiveTracker {
    state: DirectiveState,
    supported: Vec<RoundingMode>,
}

impl Default for DirectiveTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveTracker {
    /// Fresh state with [`DEFAULT_SUPPORTED_ROUNDING`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_supported_rounding(&DEFAULT_SUPPORTED_ROUNDING)
    }

    /// Fresh state treating only `modes` as implemented.
    #[must_use]
    pub fn with_supported_rounding(modes: &[RoundingMode]) -> Self {
        let supported = modes.to_vec();
        let mut state = DirectiveState::default();
        state.rounding = resolve_rounding(&supported, RoundingMode::HalfUp);
        Self { state, supported }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &DirectiveState {
        &self.state
    }

    /// Owned copy of the current state, for attaching to a parsed case.
    #[must_use]
    pub fn snapshot(&self) -> DirectiveState {
        self.state.clone()
    }

    /// Absorbs `line` if it is a directive.
    ///
    /// Returns `Ok(None)` without touching the state when the line is not a
    /// directive. A rounding mode the engine does not implement is never an
    /// error: an unimplemented mode latches [`Rounding::Unsupported`] and a
    /// token outside the vocabulary latches [`Rounding::Unrecognized`], until
    /// a supported mode replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError`] when a numeric or flag keyword carries an
    /// invalid value; the state is left unchanged.
    pub fn apply(&mut self, line: &str) -> Result<Option<Directive>, DirectiveError> {
        let Some((keyword, value)) = split_directive(line) else {
            return Ok(None);
        };

        let directive = match keyword.to_ascii_lowercase().as_str() {
            "precision" => {
                let precision = parse_number::<u32>("precision", value)?;
                if precision == 0 {
                    return Err(invalid("precision", value));
                }
                Directive::Precision(precision)
            }
            "maxexponent" => Directive::MaxExponent(parse_number("maxexponent", value)?),
            "minexponent" => Directive::MinExponent(parse_number("minexponent", value)?),
            "clamp" => Directive::Clamp(parse_flag("clamp", value)?),
            "extended" => Directive::Extended(parse_flag("extended", value)?),
            "rounding" => match RoundingMode::from_token(value) {
                Some(mode) => Directive::Rounding(resolve_rounding(&self.supported, mode)),
                None => Directive::UnrecognizedRounding(value.to_string()),
            },
            "version" => Directive::Version(value.to_string()),
            "dectest" => Directive::Include(value.to_string()),
            _ => return Ok(None),
        };

        self.commit(&directive);
        Ok(Some(directive))
    }

    fn commit(&mut self, directive: &Directive) {
        match directive {
            Directive::Precision(p) => self.state.precision = *p,
            Directive::Rounding(r) => {
                if !r.is_supported() {
                    tracing::warn!(
                        mode = %r,
                        "rounding mode not implemented; following cases are skip-worthy"
                    );
                }
                self.state.rounding = *r;
            }
            Directive::UnrecognizedRounding(token) => {
                tracing::warn!(
                    %token,
                    "unknown rounding mode; following cases are skip-worthy"
                );
                self.state.rounding = Rounding::Unrecognized;
            }
            Directive::MaxExponent(e) => self.state.max_exponent = *e,
            Directive::MinExponent(e) => self.state.min_exponent = *e,
            Directive::Clamp(c) => self.state.clamp = *c,
            Directive::Extended(x) => self.state.extended = *x,
            Directive::Version(v) => self.state.version = Some(v.clone()),
            Directive::Include(_) => {}
        }
        tracing::debug!(%directive, "directive applied");
    }
}

fn split_directive(line: &str) -> Option<(&str, &str)> {
    let line = line.find("--").map_or(line, |pos| &line[..pos]);
    let (keyword, value) = line.split_once(':')?;
    let keyword = keyword.trim();
    if keyword.is_empty() || !keyword.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((keyword, value.trim()))
}

fn resolve_rounding(supported: &[RoundingMode], mode: RoundingMode) -> Rounding {
    if supported.contains(&mode) {
        Rounding::Supported(mode)
    } else {
        Rounding::Unsupported(mode)
    }
}

fn parse_number<T: std::str::FromStr>(
    keyword: &'static str,
    value: &str,
) -> Result<T, DirectiveError> {
    value.parse().map_err(|_| invalid(keyword, value))
}

fn parse_flag(keyword: &'static str, value: &str) -> Result<bool, DirectiveError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(invalid(keyword, value)),
    }
}

fn invalid(keyword: &'static str, value: &str) -> DirectiveError {
    DirectiveError::InvalidValue {
        keyword,
        value: value.to_string(),
    }
}
