//! Source parser
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (characters → tokens, pulled one at a time)
//! - [`precedence`]: Binary operator precedence table
//! - [`parse`]: The [`Parser`](parse::Parser) struct, errors and token plumbing
//! - [`ast`]: AST node definitions
//!
//! # Language
//!
//! ```text
//! # comments run to end of line
//! extern sin(x)
//! def twice(x) x + x
//! twice(sin(1.5)) * 2
//! ```
//!
//! Expressions are numbers, variables, calls, parenthesised expressions and
//! binary operators. Operators are single characters whose precedence comes
//! from a [`PrecedenceTable`](precedence::PrecedenceTable).
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod precedence;
