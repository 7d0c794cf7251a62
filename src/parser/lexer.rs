//! Lexer (tokenizer) for the expression language
//!
//! Turns a character stream into [`Token`]s on demand. The parser pulls one
//! token at a time through [`Lexer::next_token`]; nothing is buffered beyond
//! a single character of lookahead. `#` starts a comment that runs to the end
//! of the line.

use super::ast::SourceLocation;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // End of input
    Eof(SourceLocation),

    // Keywords
    Def(SourceLocation),
    Extern(SourceLocation),

    // Primary
    Ident(String, SourceLocation),
    Number(f64, SourceLocation),

    // Any other single character: operators, parentheses, comma
    Punct(char, SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Eof(loc)
            | Token::Def(loc)
            | Token::Extern(loc)
            | Token::Ident(_, loc)
            | Token::Number(_, loc)
            | Token::Punct(_, loc) => *loc,
        }
    }

    /// True if this is the punctuation character `ch`
    pub fn is_punct(&self, ch: char) -> bool {
        matches!(self, Token::Punct(c, _) if *c == ch)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof(_) => write!(f, "end of input"),
            Token::Def(_) => write!(f, "'def'"),
            Token::Extern(_) => write!(f, "'extern'"),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Number(n, _) => write!(f, "number {}", n),
            Token::Punct(c, _) => write!(f, "'{}'", c),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// A run of digits and '.' that does not form a number, e.g. `1.2.3`
    #[error("malformed numeric literal '{text}' at {location}")]
    MalformedNumericLiteral {
        text: String,
        location: SourceLocation,
    },
}

impl LexError {
    pub fn location(&self) -> SourceLocation {
        match self {
            LexError::MalformedNumericLiteral { location, .. } => *location,
        }
    }
}

/// Lexer over any character stream
pub struct Lexer<I: Iterator<Item = char>> {
    input: Peekable<I>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<Chars<'a>> {
    /// Create a new lexer for the given source string.
    pub fn new(input: &'a str) -> Self {
        Self::from_chars(input.chars())
    }
}

impl<I: Iterator<Item = char>> Lexer<I> {
    /// Create a lexer over an arbitrary character stream.
    pub fn from_chars(input: I) -> Self {
        Self {
            input: input.peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Drain the lexer into a token list ending with `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get next token.
    ///
    /// Once the input is exhausted this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Ok(Token::Eof(loc));
        };

        match ch {
            // Identifiers and keywords: [a-zA-Z][a-zA-Z0-9]*
            c if c.is_ascii_alphabetic() => Ok(self.identifier_or_keyword(c, loc)),

            // Numbers: [0-9.]+
            c if c.is_ascii_digit() || c == '.' => self.number_literal(c, loc),

            c => Ok(Token::Punct(c, loc)),
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "def" => Token::Def(loc),
            "extern" => Token::Extern(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Parse numeric literal. The whole digit/'.' run is consumed even when
    /// it turns out to be malformed.
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match num_str.parse::<f64>() {
            Ok(value) => Ok(Token::Number(value, loc)),
            Err(_) => Err(LexError::MalformedNumericLiteral {
                text: num_str,
                location: loc,
            }),
        }
    }

    /// Skip whitespace and `#` line comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('#') => self.skip_line_comment(),
                _ => break,
            }
        }
    }

    /// Skip comment through end of line (or end of input)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' || ch == '\r' {
                break;
            }
        }
    }

    /// Peek at current character without consuming
    fn peek(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.input.next()?;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
