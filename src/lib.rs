//! # Introduction
//!
//! Kompile is the front end of a small expression language: a tokenizer and
//! a recursive-descent parser with precedence climbing for binary operators.
//! It turns source text into an owned AST ready for a later compilation
//! stage.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST (Function / Prototype)
//!                    ↓
//!             DiagnosticSink
//! ```
//!
//! 1. [`parser`]: tokenises the source on demand and builds the AST.
//! 2. [`diagnostics`]: the sink every parse failure is reported to, with
//!    console, collecting and null implementations.
//! 3. [`driver`]: the top-level loop over `def`, `extern` and bare
//!    expressions, with a configurable recovery policy after errors.
//!
//! ## Example
//!
//! ```
//! use kompile::diagnostics::CollectingSink;
//! use kompile::driver::{Driver, Recovery};
//! use kompile::parser::precedence::PrecedenceTable;
//!
//! let table = PrecedenceTable::standard();
//! let mut sink = CollectingSink::new();
//! let session = Driver::new(&table, Recovery::default())
//!     .run("def add(a b) a + b\nadd(1, 2) * 3", &mut sink);
//!
//! assert!(session.is_clean());
//! assert_eq!(session.items.len(), 2);
//! ```

pub mod diagnostics;
pub mod driver;
pub mod parser;
