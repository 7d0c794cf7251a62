//! Binary operator precedence table
//!
//! Operators are single characters. A [`PrecedenceTable`] is populated up
//! front and then borrowed read-only by every [`Parser`](super::parse::Parser)
//! that uses it; there is no process-wide table.

use super::lexer::Token;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised while populating a [`PrecedenceTable`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrecedenceError {
    #[error("operator '{op}' already has precedence {existing}")]
    DuplicateOperatorPrecedence { op: char, existing: u32 },

    #[error("'{op}' cannot be used as a binary operator")]
    InvalidOperatorCharacter { op: char },

    #[error("precedence for '{op}' must be positive")]
    InvalidPrecedence { op: char },

    #[error("malformed operator '{arg}', expected <char>=<precedence>")]
    MalformedBinopArg { arg: String },
}

/// Mapping from operator character to precedence; higher binds tighter
#[derive(Debug, Clone, Default)]
pub struct PrecedenceTable {
    entries: FxHashMap<char, u32>,
}

impl PrecedenceTable {
    /// Empty table: no character is an operator
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the standard binary operators installed.
    /// 1 is the lowest precedence.
    pub fn standard() -> Self {
        let mut entries = FxHashMap::default();
        entries.insert('<', 10);
        entries.insert('+', 20);
        entries.insert('-', 20);
        entries.insert('*', 40);
        Self { entries }
    }

    /// Register `op` with the given precedence.
    ///
    /// A failed registration leaves the table untouched.
    pub fn register(&mut self, op: char, precedence: u32) -> Result<(), PrecedenceError> {
        if !is_operator_char(op) {
            return Err(PrecedenceError::InvalidOperatorCharacter { op });
        }
        if precedence == 0 {
            return Err(PrecedenceError::InvalidPrecedence { op });
        }
        if let Some(&existing) = self.entries.get(&op) {
            return Err(PrecedenceError::DuplicateOperatorPrecedence { op, existing });
        }

        self.entries.insert(op, precedence);
        Ok(())
    }

    /// Precedence of `op`, or `None` if it is not a registered operator
    pub fn lookup(&self, op: char) -> Option<u32> {
        self.entries.get(&op).copied()
    }

    /// Precedence of the operator a token stands for, if any
    pub fn precedence_of(&self, token: &Token) -> Option<u32> {
        match token {
            Token::Punct(c, _) => self.lookup(*c),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered operators ordered by precedence, then character
    pub fn operators(&self) -> Vec<(char, u32)> {
        let mut ops: Vec<_> = self.entries.iter().map(|(&c, &p)| (c, p)).collect();
        ops.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        ops
    }
}

/// Parse an operator argument of the form `<char>=<precedence>`, e.g. `/=40`
pub fn parse_binop_arg(arg: &str) -> Result<(char, u32), PrecedenceError> {
    let malformed = || PrecedenceError::MalformedBinopArg {
        arg: arg.to_string(),
    };

    let mut chars = arg.chars();
    let op = chars.next().ok_or_else(malformed)?;
    let rest = chars.as_str().strip_prefix('=').ok_or_else(malformed)?;
    let precedence = rest.trim().parse::<u32>().map_err(|_| malformed())?;

    Ok((op, precedence))
}

// Structural characters are excluded: '(' ')' ',' drive the grammar, ';'
// separates top-level items, '#' starts a comment and '.' starts a number.
fn is_operator_char(op: char) -> bool {
    op.is_ascii_punctuation() && !matches!(op, '(' | ')' | ',' | ';' | '#' | '.')
}
