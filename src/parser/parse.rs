//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, token plumbing, and resynchronisation helpers.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: prototypes, `def`, `extern` and top-level expressions
//! - `expressions`: primary expressions and precedence climbing
//!
//! # Token position contract
//!
//! The parser holds exactly one token: [`Parser::current`]. Every parse
//! method expects it to be the first token of the construct being parsed and
//! leaves it on the first token after that construct.
//!
//! # Error reporting
//!
//! Each failure is reported to the [`DiagnosticSink`] once, where it is
//! detected, and then returned unchanged up the call chain.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::parser::ast::SourceLocation;
use crate::parser::lexer::{LexError, Lexer, Token};
use crate::parser::precedence::PrecedenceTable;
use log::trace;
use std::str::Chars;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected an expression, found {found}")]
    UnexpectedToken {
        found: String,
        location: SourceLocation,
    },

    #[error("expected '(' {context}, found {found}")]
    ExpectedOpenParen {
        context: &'static str,
        found: String,
        location: SourceLocation,
    },

    #[error("expected ')' {context}, found {found}")]
    ExpectedCloseParen {
        context: &'static str,
        found: String,
        location: SourceLocation,
    },

    #[error("expected ')' or ',' in argument list, found {found}")]
    ExpectedArgumentSeparator {
        found: String,
        location: SourceLocation,
    },

    #[error("expected function name in prototype, found {found}")]
    ExpectedFunctionName {
        found: String,
        location: SourceLocation,
    },

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::ExpectedOpenParen { location, .. }
            | ParseError::ExpectedCloseParen { location, .. }
            | ParseError::ExpectedArgumentSeparator { location, .. }
            | ParseError::ExpectedFunctionName { location, .. } => *location,
            ParseError::Lex(err) => err.location(),
        }
    }

    /// Diagnostic for this error, as reported to a [`DiagnosticSink`]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = match self {
            // LexError's own message already carries the location
            ParseError::Lex(LexError::MalformedNumericLiteral { text, .. }) => {
                format!("malformed numeric literal '{}'", text)
            }
            other => other.to_string(),
        };
        Diagnostic::error(message).with_location(self.location())
    }
}

/// Recursive descent parser pulling tokens from a [`Lexer`] on demand
pub struct Parser<'a, I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    pub(crate) current: Token,
    precedence: &'a PrecedenceTable,
    sink: &'a mut dyn DiagnosticSink,
    prime_error: Option<ParseError>,
}

impl<'a> Parser<'a, Chars<'a>> {
    /// Parser over a source string
    pub fn from_source(
        source: &'a str,
        precedence: &'a PrecedenceTable,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self::new(Lexer::new(source), precedence, sink)
    }
}

impl<'a, I: Iterator<Item = char>> Parser<'a, I> {
    /// Create a parser and prime it with the first token.
    ///
    /// Malformed literals ahead of the first token are skipped. The first of
    /// them is reported and kept for [`Parser::take_prime_error`]; any
    /// further ones are skipped quietly, as during resynchronisation.
    pub fn new(
        mut lexer: Lexer<I>,
        precedence: &'a PrecedenceTable,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let mut prime_error = None;
        let current = loop {
            match lexer.next_token() {
                Ok(token) => break token,
                Err(err) if prime_error.is_none() => {
                    let err = ParseError::from(err);
                    sink.report(err.to_diagnostic());
                    prime_error = Some(err);
                }
                Err(_) => {}
            }
        };
        trace!("token {}", current);

        Self {
            lexer,
            current,
            precedence,
            sink,
            prime_error,
        }
    }

    /// Lexical error met while priming the first token, if any. The
    /// current token is already past the malformed text.
    pub fn take_prime_error(&mut self) -> Option<ParseError> {
        self.prime_error.take()
    }

    /// The token every parse method starts from
    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn is_at_end(&self) -> bool {
        self.current.is_eof()
    }

    /// Pull the next token from the lexer.
    ///
    /// On a lexical error the current token is left as it was; the malformed
    /// characters are already consumed, so retrying makes progress.
    pub fn advance(&mut self) -> Result<(), ParseError> {
        match self.lexer.next_token() {
            Ok(token) => {
                trace!("token {}", token);
                self.current = token;
                Ok(())
            }
            Err(err) => Err(self.error(err.into())),
        }
    }

    /// Forward a diagnostic to this parser's sink
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }

    /// Report `err` to the sink and hand it back for returning
    pub(crate) fn error(&mut self, err: ParseError) -> ParseError {
        self.sink.report(err.to_diagnostic());
        err
    }

    pub(crate) fn found(&self) -> String {
        self.current.to_string()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current.location()
    }

    pub(crate) fn check_punct(&self, ch: char) -> bool {
        self.current.is_punct(ch)
    }

    pub(crate) fn expect_rparen(&mut self, context: &'static str) -> Result<(), ParseError> {
        if !self.check_punct(')') {
            let err = ParseError::ExpectedCloseParen {
                context,
                found: self.found(),
                location: self.current_location(),
            };
            return Err(self.error(err));
        }
        self.advance()
    }

    /// Precedence of the current token as a binary operator
    pub(crate) fn current_precedence(&self) -> Option<u32> {
        self.precedence.precedence_of(&self.current)
    }

    // ===== Resynchronisation =====

    /// Skip exactly one token, ignoring lexical errors
    pub fn skip_token(&mut self) {
        self.advance_quietly();
    }

    /// Skip tokens until the start of the next top-level item: `def`,
    /// `extern`, `;` or end of input
    pub fn skip_until_item(&mut self) {
        while !matches!(self.current, Token::Def(_) | Token::Extern(_) | Token::Eof(_))
            && !self.check_punct(';')
        {
            self.advance_quietly();
        }
    }

    // Lexical errors while skipping are neither reported nor fatal: the
    // lexer has consumed the bad characters, so the next pull moves on.
    fn advance_quietly(&mut self) {
        if let Ok(token) = self.lexer.next_token() {
            trace!("skipped to {}", token);
            self.current = token;
        }
    }
}
