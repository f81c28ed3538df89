//! Case-line grammar.
//!
//! ```text
//! <id> <op> <operand>{1,3} -> <result> <condition>* [-- comment]
//! ```
//!
//! [`parse_case`] handles exactly one line that the caller has already
//! established is neither blank, a comment, nor a directive. The directive
//! context is supplied by the caller and copied into the resulting [`Case`].

use std::fmt;

use crate::case::{Case, Output};
use crate::condition::Condition;
use crate::datum::Datum;
use crate::decimal::LiteralError;
use crate::directive::DirectiveState;
use crate::lexer::{Cursor, LexError, Lexeme};
use crate::operation::{
    is_operation_token, resolve_operation, resolve_operation_with_operand_count, Operation,
};

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SourceLocation {
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed byte column.
    pub column: usize,
}

/// Parse error with source location and the offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ParseError {
    /// Location of the error.
    pub location: SourceLocation,
    /// The full line as read.
    pub text: String,
    /// Kind of parse error.
    pub kind: ParseErrorKind,
}

/// Classification of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ParseErrorKind {
    /// A numeric or special literal is malformed.
    MalformedLiteral(LiteralError),
    /// A character that cannot start or continue a token here.
    UnexpectedCharacter(char),
    /// Quoted literal missing its closing quote.
    UnterminatedQuote,
    /// The line does not start with an alphanumeric id.
    MissingId,
    /// The id is not followed by whitespace.
    MissingIdTerminator,
    /// No operation token after the id.
    MissingOperation,
    /// Operation token outside the vocabulary.
    UnknownOperation(String),
    /// The line ends before `->`.
    MissingArrow,
    /// Nothing follows `->`.
    MissingResult,
    /// `?` used as an operand rather than a result.
    NoDataOperand,
    /// Condition keyword outside the vocabulary.
    UnknownCondition(String),
    /// A trailing token that cannot be a condition keyword.
    UnexpectedToken(String),
    /// Operand count does not match the operation's arity.
    OperandCount {
        /// Operation the token resolved to.
        operation: Operation,
        /// Operands the operation takes.
        expected: usize,
        /// Operands the line supplied.
        found: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.location.line, self.location.column, self.kind
        )
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLiteral(err) => write!(f, "malformed literal: {err}"),
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnterminatedQuote => write!(f, "unterminated quoted literal"),
            Self::MissingId => write!(f, "missing case id"),
            Self::MissingIdTerminator => write!(f, "case id must be followed by whitespace"),
            Self::MissingOperation => write!(f, "missing operation"),
            Self::UnknownOperation(op) => write!(f, "unknown operation: {op}"),
            Self::MissingArrow => write!(f, "missing '->'"),
            Self::MissingResult => write!(f, "missing result after '->'"),
            Self::NoDataOperand => write!(f, "'?' is only valid as a result"),
            Self::UnknownCondition(name) => write!(f, "unknown condition: {name}"),
            Self::UnexpectedToken(token) => write!(f, "unexpected token after result: {token}"),
            Self::OperandCount {
                operation,
                expected,
                found,
            } => write!(f, "{operation} takes {expected} operand(s), found {found}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses one case line under `context`.
///
/// # Errors
///
/// Returns a [`ParseError`] for the first token that does not fit the
/// grammar, an unknown operation or condition keyword, or an operand count
/// that does not match the operation.
pub fn parse_case(
    line: &str,
    line_number: usize,
    context: &DirectiveState,
) -> Result<Case, ParseError> {
    parse_tokens(line, context, line_number).map_err(|err| ParseError {
        location: SourceLocation {
            line: line_number,
            column: err.column,
        },
        text: line.to_string(),
        kind: err.kind,
    })
}

fn parse_tokens(
    line: &str,
    context: &DirectiveState,
    line_number: usize,
) -> Result<Case, LexError> {
    let mut cursor = Cursor::new(line);
    cursor.skip_whitespace();

    let id = cursor.take_while(|b| b.is_ascii_alphanumeric());
    if id.is_empty() {
        return Err(cursor.error(ParseErrorKind::MissingId));
    }
    if !cursor.is_at_end() && !cursor.peek().is_some_and(|b| b.is_ascii_whitespace()) {
        return Err(cursor.error(ParseErrorKind::MissingIdTerminator));
    }

    cursor.skip_whitespace();
    let op_column = cursor.column();
    let op_token = read_operation_token(&mut cursor)?;
    if !is_operation_token(op_token) {
        return Err(cursor.error_at(
            op_column,
            ParseErrorKind::UnknownOperation(op_token.to_string()),
        ));
    }

    let mut inputs = Vec::with_capacity(3);
    loop {
        cursor.skip_whitespace();
        if cursor.at_line_end() {
            return Err(cursor.error(ParseErrorKind::MissingArrow));
        }
        if cursor.at_arrow() {
            cursor.advance(2);
            break;
        }
        let column = cursor.column();
        match cursor.read_operand()? {
            Lexeme::NoData => return Err(cursor.error_at(column, ParseErrorKind::NoDataOperand)),
            lexeme => inputs.push(into_datum(lexeme)),
        }
    }

    let operation = resolve_operation_with_operand_count(op_token, inputs.len()).ok_or_else(|| {
        let operation = resolve_operation(op_token).unwrap_or(Operation::Power);
        cursor.error_at(
            op_column,
            ParseErrorKind::OperandCount {
                operation,
                expected: operation.operand_count(),
                found: inputs.len(),
            },
        )
    })?;

    cursor.skip_whitespace();
    if cursor.at_line_end() {
        return Err(cursor.error(ParseErrorKind::MissingResult));
    }
    let output = match cursor.read_operand()? {
        Lexeme::NoData => Output::NoData,
        lexeme => Output::Value(into_datum(lexeme)),
    };

    let mut conditions = Condition::NONE;
    loop {
        cursor.skip_whitespace();
        if cursor.at_line_end() {
            break;
        }
        let column = cursor.column();
        let word = cursor.take_word();
        if !word.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(cursor.error_at(column, ParseErrorKind::UnexpectedToken(word.to_string())));
        }
        conditions |= Condition::from_name(word).map_err(|err| {
            cursor.error_at(column, ParseErrorKind::UnknownCondition(err.0))
        })?;
    }

    Ok(Case {
        id: id.to_string(),
        operation,
        inputs,
        output,
        conditions,
        context: context.clone(),
        line: line_number,
    })
}

fn read_operation_token<'a>(cursor: &mut Cursor<'a>) -> Result<&'a str, LexError> {
    if cursor.at_line_end() {
        return Err(cursor.error(ParseErrorKind::MissingOperation));
    }
    let mark = cursor.mark();
    if cursor.take_while(|b| b.is_ascii_alphabetic()).is_empty() {
        let word = cursor.take_word();
        return Err(cursor.error_at(mark + 1, ParseErrorKind::UnknownOperation(word.to_string())));
    }
    cursor.take_while(|b| b.is_ascii_digit());
    cursor.expect_terminator()?;
    Ok(cursor.since(mark))
}

fn into_datum(lexeme: Lexeme<'_>) -> Datum {
    match lexeme {
        Lexeme::Quoted { contents, quote } => Datum::quoted(contents, quote),
        Lexeme::Literal(text) | Lexeme::Encoded(text) => Datum::new(text),
        Lexeme::NoData => Datum::new("?"),
    }
}
