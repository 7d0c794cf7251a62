//! Top-level driver loop
//!
//! Walks a whole source text item by item (`def`, `extern`, `;` or a bare
//! expression), collects the parsed items, and applies a [`Recovery`] policy
//! after each error.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::parser::ast::{Function, Prototype};
use crate::parser::lexer::{Lexer, Token};
use crate::parser::parse::{ParseError, Parser};
use crate::parser::precedence::PrecedenceTable;
use log::{debug, info};
use std::fmt;
use std::str::FromStr;

/// What to do with the rest of the input after a parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recovery {
    /// Drop the offending token and try again from the next one
    SkipToken,
    /// Drop tokens up to the next `def`, `extern`, `;` or end of input
    #[default]
    SkipToItem,
    /// Stop at the first error
    Halt,
}

impl FromStr for Recovery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip-token" => Ok(Recovery::SkipToken),
            "skip-item" => Ok(Recovery::SkipToItem),
            "halt" => Ok(Recovery::Halt),
            other => Err(format!(
                "unknown recovery policy '{}' (expected skip-token, skip-item or halt)",
                other
            )),
        }
    }
}

/// One successfully parsed top-level unit
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Definition(Function),
    Extern(Prototype),
    Expression(Function),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Definition(func) => write!(f, "{}", func),
            Item::Extern(proto) => write!(f, "extern {}", proto),
            Item::Expression(func) => write!(f, "{}", func.body),
        }
    }
}

/// Result of running the driver over one input
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub items: Vec<Item>,
    pub errors: usize,
    /// True if parsing stopped before the end of input
    pub halted: bool,
}

impl Session {
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// Parses whole inputs against one precedence table
pub struct Driver<'t> {
    precedence: &'t PrecedenceTable,
    recovery: Recovery,
}

impl<'t> Driver<'t> {
    pub fn new(precedence: &'t PrecedenceTable, recovery: Recovery) -> Self {
        Self {
            precedence,
            recovery,
        }
    }

    pub fn recovery(&self) -> Recovery {
        self.recovery
    }

    /// Parse every item in `source`, reporting failures to `sink`
    pub fn run(&self, source: &str, sink: &mut dyn DiagnosticSink) -> Session {
        let mut session = Session::default();

        let mut parser = Parser::from_source(source, self.precedence, sink);

        if let Some(err) = parser.take_prime_error() {
            session.errors += 1;
            debug!("recovering from '{}' with {:?}", err, self.recovery);
            if !self.recover(&mut parser, ErrorSite::BeforeFirstToken) {
                session.halted = true;
                return session;
            }
        }

        loop {
            let result = match parser.current() {
                Token::Eof(_) => break,
                Token::Punct(';', _) => {
                    // ignore top-level semicolons
                    match parser.advance() {
                        Ok(()) => continue,
                        Err(err) => Err(err),
                    }
                }
                Token::Def(_) => parser.parse_definition().map(Item::Definition),
                Token::Extern(_) => parser.parse_extern().map(Item::Extern),
                _ => parser
                    .parse_top_level_expression()
                    .map(Item::Expression),
            };

            match result {
                Ok(item) => {
                    debug!("parsed {}", describe(&item));
                    session.items.push(item);
                }
                Err(err) => {
                    session.errors += 1;
                    debug!("recovering from '{}' with {:?}", err, self.recovery);
                    let site = match err {
                        ParseError::Lex(_) => ErrorSite::AfterToken,
                        _ => ErrorSite::AtToken,
                    };
                    if !self.recover(&mut parser, site) {
                        session.halted = true;
                        break;
                    }
                }
            }
        }

        info!(
            "parsed {} item(s) with {} error(s)",
            session.items.len(),
            session.errors
        );
        session
    }

    /// Apply the recovery policy; false means stop parsing
    fn recover<I: Iterator<Item = char>>(
        &self,
        parser: &mut Parser<'_, I>,
        site: ErrorSite,
    ) -> bool {
        match self.recovery {
            Recovery::SkipToken => {
                // Malformed text before the first token is already consumed
                if site != ErrorSite::BeforeFirstToken {
                    parser.skip_token();
                }
                true
            }
            Recovery::SkipToItem => {
                // A lexical error leaves the current token untouched, so it
                // may still be the keyword that started the broken item.
                if site == ErrorSite::AfterToken {
                    parser.skip_token();
                }
                parser.skip_until_item();
                true
            }
            Recovery::Halt => {
                if !parser.is_at_end() {
                    parser.report(
                        Diagnostic::warning("stopped at first error; remaining input ignored")
                            .with_location(parser.current().location()),
                    );
                }
                false
            }
        }
    }
}

/// Where the current token stands when an error is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorSite {
    /// The current token is the one that failed
    AtToken,
    /// A malformed literal followed the current token
    AfterToken,
    /// A malformed literal preceded the first token
    BeforeFirstToken,
}

/// Lex all of `source` for a token dump. Malformed literals are reported to
/// `sink` and skipped; the result ends with `Eof` and carries the error count.
pub fn scan_tokens(source: &str, sink: &mut dyn DiagnosticSink) -> (Vec<Token>, usize) {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = 0;

    loop {
        match lexer.next_token() {
            Ok(token) => {
                let done = token.is_eof();
                tokens.push(token);
                if done {
                    break;
                }
            }
            Err(err) => {
                errors += 1;
                sink.report(ParseError::from(err).to_diagnostic());
            }
        }
    }

    (tokens, errors)
}

fn describe(item: &Item) -> String {
    match item {
        Item::Definition(func) => format!("definition of '{}'", func.proto.name),
        Item::Extern(proto) => format!("extern '{}'", proto.name),
        Item::Expression(_) => "top-level expression".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Severity};

    fn run(source: &str, recovery: Recovery) -> (Session, CollectingSink) {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let session = Driver::new(&table, recovery).run(source, &mut sink);
        (session, sink)
    }

    #[test]
    fn test_parses_all_item_kinds() {
        let (session, sink) = run(
            "extern sin(x); def f(a) a*2; f(3) + sin(1)",
            Recovery::default(),
        );

        assert!(session.is_clean());
        assert!(sink.is_empty());
        assert_eq!(session.items.len(), 3);
        assert!(matches!(session.items[0], Item::Extern(ref p) if p.name == "sin"));
        assert!(matches!(session.items[1], Item::Definition(ref f) if f.proto.name == "f"));
        assert!(matches!(session.items[2], Item::Expression(ref f) if f.proto.is_anonymous()));
    }

    #[test]
    fn test_empty_input() {
        let (session, _) = run("  # nothing here\n", Recovery::default());
        assert!(session.items.is_empty());
        assert!(session.is_clean());
        assert!(!session.halted);
    }

    #[test]
    fn test_skip_to_item_recovers_at_next_definition() {
        let (session, sink) = run("def f(a, b) a\ndef g(x) x+1", Recovery::SkipToItem);

        assert_eq!(session.errors, 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(session.items.len(), 1);
        assert!(matches!(session.items[0], Item::Definition(ref f) if f.proto.name == "g"));
    }

    #[test]
    fn test_skip_token_resumes_after_bad_token() {
        // ')' cannot start an expression; skipping it leaves `1 + 2`
        let (session, _) = run(") 1 + 2", Recovery::SkipToken);

        assert_eq!(session.errors, 1);
        assert_eq!(session.items.len(), 1);
        assert_eq!(session.items[0].to_string(), "(1 + 2)");
    }

    #[test]
    fn test_halt_stops_at_first_error() {
        let (session, sink) = run("def (x) x; def g(x) x", Recovery::Halt);

        assert!(session.halted);
        assert_eq!(session.errors, 1);
        assert!(session.items.is_empty());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.diagnostics[1].severity, Severity::Warning);
    }

    #[test]
    fn test_malformed_number_in_definition() {
        let (session, sink) = run("def f(x) x + 1.2.3\nextern g()", Recovery::SkipToItem);

        assert_eq!(session.errors, 1);
        assert_eq!(sink.messages(), vec!["malformed numeric literal '1.2.3'"]);
        assert_eq!(session.items.len(), 1);
        assert!(matches!(session.items[0], Item::Extern(ref p) if p.name == "g"));
    }

    #[test]
    fn test_malformed_first_token_skips_to_next_item() {
        let (session, sink) = run("1..2\ndef f(x) x", Recovery::SkipToItem);

        assert!(!session.halted);
        assert_eq!(session.errors, 1);
        assert_eq!(sink.messages(), vec!["malformed numeric literal '1..2'"]);
        assert_eq!(session.items.len(), 1);
        assert!(matches!(session.items[0], Item::Definition(ref f) if f.proto.name == "f"));
    }

    #[test]
    fn test_malformed_first_token_matches_later_position() {
        // The same literal as the first or the second token recovers alike
        let (first, _) = run("1..2\ndef f(x) x", Recovery::SkipToItem);
        let (second, _) = run("0\n1..2\ndef f(x) x", Recovery::SkipToItem);

        assert_eq!(first.items, second.items);
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.halted, second.halted);
    }

    #[test]
    fn test_malformed_first_token_skip_token() {
        let (session, _) = run("1..2 + 3; 4", Recovery::SkipToken);

        // '+' cannot start an expression and is dropped next
        assert!(!session.halted);
        assert_eq!(session.errors, 2);
        let rendered: Vec<String> = session.items.iter().map(|i| i.to_string()).collect();
        assert_eq!(rendered, vec!["3", "4"]);
    }

    #[test]
    fn test_malformed_first_token_halt() {
        let (session, sink) = run("1..2 + 3", Recovery::Halt);

        assert!(session.halted);
        assert_eq!(session.errors, 1);
        assert!(session.items.is_empty());
        assert_eq!(sink.diagnostics[1].severity, Severity::Warning);
    }

    #[test]
    fn test_scan_tokens_continues_past_malformed_literals() {
        let mut sink = CollectingSink::new();
        let (tokens, errors) = scan_tokens("a 1.2.3 + ..", &mut sink);

        assert_eq!(errors, 2);
        assert_eq!(sink.len(), 2);
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[0], Token::Ident(ref s, _) if s == "a"));
        assert!(tokens[1].is_punct('+'));
        assert!(tokens[2].is_eof());
    }

    #[test]
    fn test_scan_tokens_clean_input() {
        let (tokens, errors) = scan_tokens("def f(x)", &mut CollectingSink::new());
        assert_eq!(errors, 0);
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_recovery_from_str() {
        assert_eq!("skip-token".parse::<Recovery>(), Ok(Recovery::SkipToken));
        assert_eq!("skip-item".parse::<Recovery>(), Ok(Recovery::SkipToItem));
        assert_eq!("halt".parse::<Recovery>(), Ok(Recovery::Halt));
        assert!("retry".parse::<Recovery>().is_err());
    }

    #[test]
    fn test_item_display() {
        let (session, _) = run("extern cos(a b); def id(x) x; 4*2", Recovery::default());
        let rendered: Vec<String> = session.items.iter().map(|i| i.to_string()).collect();
        assert_eq!(rendered, vec!["extern cos(a b)", "def id(x) x", "(4 * 2)"]);
    }
}
