//! Single-pass byte cursor over one case line.
//!
//! Token classes are told apart by their first one or two bytes, so the
//! cursor never backtracks. Every token must end at whitespace or end of
//! line.

use crate::decimal::{scan_literal, LiteralError};
use crate::parser::ParseErrorKind;

/// A lexing failure at a 1-based column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub(crate) column: usize,
    pub(crate) kind: ParseErrorKind,
}

/// An operand or result token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lexeme<'a> {
    /// Quoted literal with doubled quotes already collapsed.
    Quoted { contents: String, quote: char },
    /// `?`.
    NoData,
    /// Numeric literal or special value, as written.
    Literal(&'a str),
    /// `#` null reference or hex encoding, as written.
    Encoded(&'a str),
}

pub(crate) struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    /// 1-based column of the next byte.
    pub(crate) const fn column(&self) -> usize {
        self.pos + 1
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn at_terminator_after(&self, len: usize) -> bool {
        self.peek_at(len).is_none_or(|b| b.is_ascii_whitespace())
    }

    /// `->` standing alone as a token.
    pub(crate) fn at_arrow(&self) -> bool {
        self.peek() == Some(b'-') && self.peek_at(1) == Some(b'>') && self.at_terminator_after(2)
    }

    /// `--` opening a trailing comment.
    pub(crate) fn at_comment(&self) -> bool {
        self.peek() == Some(b'-') && self.peek_at(1) == Some(b'-')
    }

    /// True at end of line or at a trailing comment.
    pub(crate) fn at_line_end(&self) -> bool {
        self.is_at_end() || self.at_comment()
    }

    /// Byte offset of the next byte, for [`Cursor::since`].
    pub(crate) const fn mark(&self) -> usize {
        self.pos
    }

    /// Text consumed since `mark`.
    pub(crate) fn since(&self, mark: usize) -> &'a str {
        &self.text[mark..self.pos]
    }

    pub(crate) fn advance(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.bytes.len());
    }

    pub(crate) fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Consumes the rest of the current whitespace-delimited token.
    pub(crate) fn take_word(&mut self) -> &'a str {
        self.take_while(|b| !b.is_ascii_whitespace())
    }

    /// Fails unless the cursor sits at whitespace or end of line.
    pub(crate) fn expect_terminator(&self) -> Result<(), LexError> {
        match self.text[self.pos..].chars().next() {
            Some(c) if !c.is_ascii_whitespace() => {
                Err(self.error(ParseErrorKind::UnexpectedCharacter(c)))
            }
            _ => Ok(()),
        }
    }

    pub(crate) const fn error(&self, kind: ParseErrorKind) -> LexError {
        self.error_at(self.pos + 1, kind)
    }

    pub(crate) const fn error_at(&self, column: usize, kind: ParseErrorKind) -> LexError {
        LexError { column, kind }
    }

    /// Reads one operand or result token.
    pub(crate) fn read_operand(&mut self) -> Result<Lexeme<'a>, LexError> {
        let start = self.pos;
        let lexeme = match self.peek() {
            Some(quote @ (b'\'' | b'"')) => self.read_quoted(quote)?,
            Some(b'?') => {
                self.pos += 1;
                Lexeme::NoData
            }
            Some(b'#') => {
                self.pos += 1;
                self.take_while(|b| b.is_ascii_hexdigit());
                Lexeme::Encoded(&self.text[start..self.pos])
            }
            Some(b) if b == b'+' || b == b'-' || b == b'.' || b.is_ascii_alphanumeric() => {
                let (_, end) = scan_literal(self.bytes, start).map_err(|err| {
                    self.error_at(start + 1, ParseErrorKind::MalformedLiteral(err))
                })?;
                self.pos = end;
                if self.peek().is_some_and(|b| b.is_ascii_alphanumeric())
                    || self.peek() == Some(b'.')
                {
                    let trailing = self.take_word();
                    let c = trailing.chars().next().unwrap_or('.');
                    return Err(self.error_at(
                        start + 1,
                        ParseErrorKind::MalformedLiteral(LiteralError::UnexpectedCharacter(c)),
                    ));
                }
                Lexeme::Literal(&self.text[start..self.pos])
            }
            Some(_) => {
                let c = self.text[start..].chars().next().unwrap_or('?');
                return Err(self.error(ParseErrorKind::UnexpectedCharacter(c)));
            }
            None => return Err(self.error(ParseErrorKind::MissingResult)),
        };
        self.expect_terminator()?;
        Ok(lexeme)
    }

    fn read_quoted(&mut self, q: u8) -> Result<Lexeme<'a>, LexError> {
        let open = self.pos;
        let quote = char::from(q);
        self.pos += 1;
        let mut contents = String::new();
        loop {
            let run = self.take_while(|b| b != q);
            contents.push_str(run);
            if self.is_at_end() {
                return Err(self.error_at(open + 1, ParseErrorKind::UnterminatedQuote));
            }
            if self.peek_at(1) == Some(q) {
                contents.push(quote);
                self.pos += 2;
            } else {
                self.pos += 1;
                return Ok(Lexeme::Quoted { contents, quote });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cursor, Lexeme};
    use crate::decimal::LiteralError;
    use crate::parser::ParseErrorKind;

    fn lex_one(text: &str) -> Result<Lexeme<'_>, ParseErrorKind> {
        Cursor::new(text).read_operand().map_err(|e| e.kind)
    }

    #[test]
    fn quoted_literals_collapse_doubled_quotes() {
        assert_eq!(
            lex_one("'it''s' rest"),
            Ok(Lexeme::Quoted {
                contents: "it's".to_string(),
                quote: '\''
            })
        );
        assert_eq!(
            lex_one("\"1E+2\""),
            Ok(Lexeme::Quoted {
                contents: "1E+2".to_string(),
                quote: '"'
            })
        );
        assert_eq!(
            lex_one("''"),
            Ok(Lexeme::Quoted {
                contents: String::new(),
                quote: '\''
            })
        );
    }

    #[test]
    fn unterminated_quote_is_reported_at_the_opening_quote() {
        let err = Cursor::new("'12").read_operand().expect_err("unterminated");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedQuote);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn literal_and_special_tokens_keep_their_text() {
        assert_eq!(lex_one("-1.5E+3 "), Ok(Lexeme::Literal("-1.5E+3")));
        assert_eq!(lex_one("-Inf"), Ok(Lexeme::Literal("-Inf")));
        assert_eq!(lex_one("sNaN42"), Ok(Lexeme::Literal("sNaN42")));
        assert_eq!(lex_one("?"), Ok(Lexeme::NoData));
        assert_eq!(lex_one("#22380000"), Ok(Lexeme::Encoded("#22380000")));
        assert_eq!(lex_one("#"), Ok(Lexeme::Encoded("#")));
    }

    #[test]
    fn malformed_literals_surface_their_cause() {
        assert_eq!(
            lex_one("1E+"),
            Err(ParseErrorKind::MalformedLiteral(
                LiteralError::MissingExponentDigits
            ))
        );
        assert_eq!(
            lex_one("1.2.3"),
            Err(ParseErrorKind::MalformedLiteral(
                LiteralError::UnexpectedCharacter('.')
            ))
        );
        assert_eq!(
            lex_one("12abc"),
            Err(ParseErrorKind::MalformedLiteral(
                LiteralError::UnexpectedCharacter('a')
            ))
        );
        assert_eq!(
            lex_one("Infinite"),
            Err(ParseErrorKind::MalformedLiteral(LiteralError::UnknownSpecial(
                "Infinite".to_string()
            )))
        );
    }

    #[test]
    fn tokens_need_a_terminator() {
        assert_eq!(lex_one("?x"), Err(ParseErrorKind::UnexpectedCharacter('x')));
        assert_eq!(lex_one("'1'2"), Err(ParseErrorKind::UnexpectedCharacter('2')));
        assert_eq!(lex_one("1->"), Err(ParseErrorKind::UnexpectedCharacter('-')));
    }

    #[test]
    fn arrow_must_stand_alone() {
        assert!(Cursor::new("-> 2").at_arrow());
        assert!(Cursor::new("->").at_arrow());
        assert!(!Cursor::new("->2").at_arrow());
        assert!(!Cursor::new("-2").at_arrow());
        assert!(Cursor::new("-- note").at_comment());
    }
}
