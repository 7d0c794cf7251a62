//! Expression parsing implementation
//!
//! Primary expressions are parsed by recursive descent; chains of binary
//! operators are folded by precedence climbing against the parser's
//! [`PrecedenceTable`](crate::parser::precedence::PrecedenceTable).
//!
//! # Grammar
//!
//! ```text
//! expression     ::= primary binoprhs
//! binoprhs       ::= (binop primary)*
//! primary        ::= identifierexpr | numberexpr | parenexpr
//! identifierexpr ::= identifier | identifier '(' (expression (',' expression)*)? ')'
//! numberexpr     ::= number
//! parenexpr      ::= '(' expression ')'
//! ```
//!
//! All parsing methods are implemented as methods on the [`Parser`] struct.

use crate::parser::ast::Expr;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl<'a, I: Iterator<Item = char>> Parser<'a, I> {
    /// Parse expression (top-level entry point)
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_primary()?;
        self.parse_binop_rhs(0, lhs)
    }

    /// Fold the operator chain following `lhs`.
    ///
    /// Only operators binding at least as tightly as `min_prec` are consumed.
    /// Equal precedence associates to the left; a tighter operator to the
    /// right of the candidate RHS claims it through recursion first.
    pub fn parse_binop_rhs(&mut self, min_prec: u32, mut lhs: Expr) -> Result<Expr, ParseError> {
        loop {
            let (op, tok_prec) = match (&self.current, self.current_precedence()) {
                (Token::Punct(op, _), Some(prec)) if prec >= min_prec => (*op, prec),
                _ => return Ok(lhs),
            };
            self.advance()?; // eat binop

            let mut rhs = self.parse_primary()?;

            if self.current_precedence().is_some_and(|next| next > tok_prec) {
                rhs = self.parse_binop_rhs(tok_prec + 1, rhs)?;
            }

            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    /// Parse primary (identifiers, calls, numbers, parenthesized expressions)
    pub fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current {
            Token::Ident(ref name, _) => {
                let name = name.clone();
                self.parse_identifier_expr(name)
            }
            Token::Number(value, _) => {
                self.advance()?;
                Ok(Expr::Number(value))
            }
            Token::Punct('(', _) => self.parse_paren_expr(),
            _ => {
                let err = ParseError::UnexpectedToken {
                    found: self.found(),
                    location: self.current_location(),
                };
                Err(self.error(err))
            }
        }
    }

    /// Parse `'(' expression ')'`
    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.advance()?; // eat '('
        let expr = self.parse_expression()?;
        self.expect_rparen("after expression")?;
        Ok(expr)
    }

    /// Parse a variable reference or a call; `name` is the current token
    fn parse_identifier_expr(&mut self, name: String) -> Result<Expr, ParseError> {
        self.advance()?; // eat identifier

        if !self.check_punct('(') {
            return Ok(Expr::Variable(name));
        }

        self.advance()?; // eat '('
        let args = self.parse_argument_list()?;
        self.advance()?; // eat ')'

        Ok(Expr::Call { callee: name, args })
    }

    /// Parse call arguments up to, but not including, the closing ')'
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if self.check_punct(')') {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);

            if self.check_punct(')') {
                break;
            }

            if !self.check_punct(',') {
                let err = ParseError::ExpectedArgumentSeparator {
                    found: self.found(),
                    location: self.current_location(),
                };
                return Err(self.error(err));
            }
            self.advance()?; // eat ','
        }

        Ok(args)
    }
}
