//! Whole-file scanning: routes each line to the directive tracker or the
//! case parser, in line order.

use std::collections::HashSet;

use thiserror::Error;

use crate::case::Case;
use crate::directive::{Directive, DirectiveError, DirectiveTracker};
use crate::parser::{parse_case, ParseError};

/// A significant line after routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItem {
    /// A directive that was applied to the tracker.
    Directive(Directive),
    /// A parsed case carrying its directive snapshot.
    Case(Box<Case>),
}

/// A line that could not be absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// Case line outside the grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Known directive keyword with a bad value.
    #[error("line {line}: {source}")]
    Directive {
        /// 1-based line number.
        line: usize,
        /// The full line as read.
        text: String,
        /// What was wrong with the value.
        #[source]
        source: DirectiveError,
    },
}

impl LineError {
    /// 1-based line number of the failing line.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Parse(err) => err.location.line,
            Self::Directive { line, .. } => *line,
        }
    }
}

/// One scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    /// 1-based line number.
    pub line: usize,
    /// What the line turned into.
    pub item: Result<LineItem, LineError>,
}

/// Iterator over the significant lines of one corpus file.
///
/// Blank lines and lines whose first non-blank character is `-` are
/// skipped. The scanner owns its [`DirectiveTracker`], so state never leaks
/// between files. A case id seen earlier in the same file is logged at
/// `warn` and recorded, but the case is still yielded.
#[derive(Debug, Clone)]
pub struct CaseScanner<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    tracker: DirectiveTracker,
    seen: HashSet<String>,
    duplicates: Vec<(usize, String)>,
}

impl<'a> CaseScanner<'a> {
    /// Scans `text` from a fresh default tracker.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self::with_tracker(text, DirectiveTracker::new())
    }

    /// Scans `text` starting from `tracker`.
    #[must_use]
    pub fn with_tracker(text: &'a str, tracker: DirectiveTracker) -> Self {
        Self {
            lines: text.lines().enumerate(),
            tracker,
            seen: HashSet::new(),
            duplicates: Vec::new(),
        }
    }

    /// Line number and id of every case whose id repeated an earlier one.
    #[must_use]
    pub fn duplicate_ids(&self) -> &[(usize, String)] {
        &self.duplicates
    }

    /// Directive state as of the last yielded line.
    #[must_use]
    pub const fn tracker(&self) -> &DirectiveTracker {
        &self.tracker
    }

    fn route(&mut self, line: usize, text: &str) -> Result<LineItem, LineError> {
        match self.tracker.apply(text) {
            Ok(Some(directive)) => Ok(LineItem::Directive(directive)),
            Ok(None) => {
                let case = parse_case(text, line, self.tracker.state())?;
                if !self.seen.insert(case.id.clone()) {
                    tracing::warn!(line, id = %case.id, "duplicate case id");
                    self.duplicates.push((line, case.id.clone()));
                }
                Ok(LineItem::Case(Box::new(case)))
            }
            Err(source) => Err(LineError::Directive {
                line,
                text: text.to_string(),
                source,
            }),
        }
    }
}

impl Iterator for CaseScanner<'_> {
    type Item = ScannedLine;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, text) = self.lines.next()?;
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('-') {
                continue;
            }
            let line = index + 1;
            let item = self.route(line, text);
            return Some(ScannedLine { line, item });
        }
    }
}

/// Parses every case in `text`, dropping directive lines.
///
/// Each element is one case line or one line that failed, in file order.
#[must_use]
pub fn parse_cases(text: &str) -> Vec<Result<Case, LineError>> {
    CaseScanner::new(text)
        .filter_map(|scanned| match scanned.item {
            Ok(LineItem::Case(case)) => Some(Ok(*case)),
            Ok(LineItem::Directive(_)) => None,
            Err(err) => Some(Err(err)),
        })
        .collect()
}
