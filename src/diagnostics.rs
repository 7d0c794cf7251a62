//! Diagnostic reporting
//!
//! The parser never prints. Every failure is handed to a [`DiagnosticSink`]
//! at the point it is detected; the sink decides where it goes.

use crate::parser::ast::SourceLocation;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use std::fmt;
use std::io::{self, Write};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(loc) = self.location {
            write!(f, "\n  --> {}", loc)?;
        }
        Ok(())
    }
}

/// Destination for parse diagnostics
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Writes diagnostics to stderr, styled when stderr is a terminal
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    color: bool,
}

impl ConsoleSink {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colour only if stderr is attached to a terminal
    pub fn stderr() -> Self {
        Self::new(io::stderr().is_tty())
    }

    fn render(&self, diagnostic: &Diagnostic) -> String {
        if !self.color {
            return diagnostic.to_string();
        }

        let label = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        let mut out = format!("{}: {}", label, diagnostic.message.as_str().bold());
        if let Some(loc) = diagnostic.location {
            out.push_str(&format!("\n  {} {}", "-->".blue(), loc));
        }
        out
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl DiagnosticSink for ConsoleSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        let rendered = self.render(&diagnostic);
        // Nowhere left to report a failed write to stderr
        let _ = writeln!(io::stderr().lock(), "{}", rendered);
    }
}

/// Keeps every diagnostic in memory, in report order
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Messages only, for quick assertions
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rendering() {
        let diag = Diagnostic::error("expected ')'").with_location(SourceLocation::new(3, 7));
        assert_eq!(diag.to_string(), "error: expected ')'\n  --> 3:7");

        let sink = ConsoleSink::new(false);
        assert_eq!(sink.render(&diag), diag.to_string());
    }

    #[test]
    fn test_colored_rendering_keeps_text() {
        let diag = Diagnostic::warning("odd").with_location(SourceLocation::new(1, 2));
        let rendered = ConsoleSink::new(true).render(&diag);
        assert!(rendered.contains("warning"));
        assert!(rendered.contains("odd"));
        assert!(rendered.contains("1:2"));
    }

    #[test]
    fn test_collecting_sink() {
        let mut sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.report(Diagnostic::warning("first"));
        sink.report(Diagnostic::error("second"));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.diagnostics[1].severity, Severity::Error);
        assert_eq!(sink.messages(), vec!["first", "second"]);
    }
}
