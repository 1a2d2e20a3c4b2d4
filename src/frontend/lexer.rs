use std::{collections::BTreeMap, str::Chars};

use itertools::{PeekNth, peek_nth};
use once_cell::sync::Lazy;

use super::parser::ParseError;
use crate::frontend::SourceFile;

#[derive(Debug)]
pub struct Lexer<'source> {
    position: usize,
    chars: PeekNth<Chars<'source>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line break separates this token from the previous one
    pub starts_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier, // x

    /* Literals */
    IntegerLiteral, // 1
    FloatLiteral,   // 1.0

    /* Delimiters */
    OpenParen,  // (
    CloseParen, // )
    OpenBrace,  // {
    CloseBrace, // }
    Semicolon,  // ;
    Comma,      // ,

    /* Binary Ops */
    Plus,                 // +
    Minus,                // -
    Asterisk,             // *
    Divide,               // /
    DoubleEquals,         // ==
    NotEquals,            // !=
    LessThan,             // <
    LessThanOrEqualTo,    // <=
    GreaterThan,          // >
    GreaterThanOrEqualTo, // >=

    /* Assignment */
    Equals, // =
}

impl TokenKind {
    pub fn is_comparison_operator(&self) -> bool {
        matches!(
            self,
            Self::DoubleEquals
                | Self::NotEquals
                | Self::LessThan
                | Self::LessThanOrEqualTo
                | Self::GreaterThan
                | Self::GreaterThanOrEqualTo
        )
    }

    pub fn is_term_operator(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus)
    }

    pub fn is_factor_operator(&self) -> bool {
        matches!(self, Self::Asterisk | Self::Divide)
    }
}

/// Table of single char tokens (matched after longer sequences are checked for)
static SINGLE_TOKENS: Lazy<BTreeMap<char, TokenKind>> = Lazy::new(|| {
    BTreeMap::from([
        ('(', TokenKind::OpenParen),
        (')', TokenKind::CloseParen),
        ('{', TokenKind::OpenBrace),
        ('}', TokenKind::CloseBrace),
        (';', TokenKind::Semicolon),
        (',', TokenKind::Comma),
        ('+', TokenKind::Plus),
        ('-', TokenKind::Minus),
        ('*', TokenKind::Asterisk),
        ('/', TokenKind::Divide),
        ('=', TokenKind::Equals),
        ('<', TokenKind::LessThan),
        ('>', TokenKind::GreaterThan),
    ])
});

/// Table of two char tokens, checked before [`SINGLE_TOKENS`]
static DOUBLE_TOKENS: Lazy<BTreeMap<(char, char), TokenKind>> = Lazy::new(|| {
    BTreeMap::from([
        (('=', '='), TokenKind::DoubleEquals),
        (('!', '='), TokenKind::NotEquals),
        (('<', '='), TokenKind::LessThanOrEqualTo),
        (('>', '='), TokenKind::GreaterThanOrEqualTo),
    ])
});

/// Byte range into the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source SourceFile) -> Self {
        Self {
            chars: peek_nth(source.contents.chars()),
            position: 0,
        }
    }

    /// Consumes the whole source file
    pub fn tokenize(source: &'source SourceFile) -> Result<Vec<Token>, ParseError> {
        let mut lexer = Self::new(source);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn advance(&mut self) {
        self.chars.next();
        self.position += 1;
    }

    /// Returns whether a line break was skipped
    fn ignore_whitespace(&mut self) -> bool {
        let mut line_break = false;

        while let Some(c) = self.chars.peek().copied() {
            if !c.is_ascii_whitespace() {
                break;
            }

            line_break |= c == '\n';
            self.advance();
        }

        line_break
    }

    fn ignore_line(&mut self) {
        while let Some(c) = self.chars.peek().copied() {
            if c == '\n' {
                break;
            }

            self.advance();
        }
    }

    fn read_word(&mut self) -> Token {
        let start_position = self.position;

        while let Some(c) = self.chars.peek().copied() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }

            self.advance();
        }

        Token {
            kind: TokenKind::Identifier,
            span: self.new_span(start_position),
            starts_line: false,
        }
    }

    fn read_number(&mut self) -> Token {
        let start_position = self.position;
        let mut kind = TokenKind::IntegerLiteral;

        while let Some(c) = self.chars.peek().copied() {
            if c == '.' {
                kind = TokenKind::FloatLiteral;
                self.read_decimal_part();
                break;
            }

            if !c.is_ascii_digit() {
                break;
            }

            self.advance();
        }

        Token {
            kind,
            span: self.new_span(start_position),
            starts_line: false,
        }
    }

    fn read_decimal_part(&mut self) -> Token {
        let start_position = self.position;

        // Consume the decimal point
        self.advance();

        while let Some(c) = self.chars.peek().copied() {
            if !c.is_ascii_digit() {
                break;
            }

            self.advance();
        }

        Token {
            kind: TokenKind::FloatLiteral,
            span: self.new_span(start_position),
            starts_line: false,
        }
    }

    fn read_fixed(&mut self, kind: TokenKind, length: usize) -> Token {
        let start_position = self.position;

        for _ in 0..length {
            self.advance();
        }

        Token {
            kind,
            span: self.new_span(start_position),
            starts_line: false,
        }
    }

    fn new_span(&self, start: usize) -> Span {
        Span {
            start,
            end: self.position,
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let mut line_break = false;

        while let Some(c) = self.chars.peek().copied() {
            if !c.is_ascii() {
                return Err(ParseError::new(
                    format!("unexpected non-ascii character in stream: `{c}`"),
                    Span::new(self.position, self.position + c.len_utf8()),
                ));
            }

            let token = match c {
                c if c.is_ascii_whitespace() => {
                    line_break |= self.ignore_whitespace();
                    continue;
                }
                '/' if self.chars.peek_nth(1).is_some_and(|c| *c == '/') => {
                    self.ignore_line();
                    continue;
                }

                n if n.is_ascii_digit() => self.read_number(),
                '.' if self.chars.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.read_decimal_part()
                }

                a if a.is_ascii_alphabetic() || a == '_' => self.read_word(),

                c if self
                    .chars
                    .peek_nth(1)
                    .is_some_and(|next| DOUBLE_TOKENS.contains_key(&(c, *next))) =>
                {
                    let next = *self.chars.peek_nth(1).unwrap_or(&c);
                    self.read_fixed(DOUBLE_TOKENS[&(c, next)], 2)
                }
                s if SINGLE_TOKENS.contains_key(&s) => self.read_fixed(SINGLE_TOKENS[&s], 1),

                c => {
                    return Err(ParseError::new(
                        format!("unexpected character in stream: `{c}`"),
                        Span::new(self.position, self.position + 1),
                    ));
                }
            };

            return Ok(Some(Token {
                starts_line: line_break,
                ..token
            }));
        }

        Ok(None)
    }
}
