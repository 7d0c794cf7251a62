//! Declaration parsing implementation
//!
//! This module handles parsing of the top-level constructs:
//!
//! - Function definitions: `def name(params) body`
//! - Extern declarations: `extern name(params)`
//! - Bare top-level expressions, wrapped as anonymous zero-argument functions
//!
//! # Grammar
//!
//! ```text
//! definition   ::= 'def' prototype expression
//! external     ::= 'extern' prototype
//! toplevelexpr ::= expression
//! prototype    ::= identifier '(' identifier* ')'
//! ```

use crate::parser::ast::{Function, Prototype};
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl<'a, I: Iterator<Item = char>> Parser<'a, I> {
    /// Parse `identifier '(' identifier* ')'`
    pub fn parse_prototype(&mut self) -> Result<Prototype, ParseError> {
        let name = match &self.current {
            Token::Ident(name, _) => name.clone(),
            _ => {
                let err = ParseError::ExpectedFunctionName {
                    found: self.found(),
                    location: self.current_location(),
                };
                return Err(self.error(err));
            }
        };
        self.advance()?;

        if !self.check_punct('(') {
            let err = ParseError::ExpectedOpenParen {
                context: "in prototype",
                found: self.found(),
                location: self.current_location(),
            };
            return Err(self.error(err));
        }

        let mut params = Vec::new();
        loop {
            self.advance()?;
            match &self.current {
                Token::Ident(param, _) => params.push(param.clone()),
                _ => break,
            }
        }

        self.expect_rparen("in prototype")?;

        Ok(Prototype::new(name, params))
    }

    /// Parse `'def' prototype expression`
    pub fn parse_definition(&mut self) -> Result<Function, ParseError> {
        self.advance()?; // eat 'def'
        let proto = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(Function::new(proto, body))
    }

    /// Parse `'extern' prototype`
    pub fn parse_extern(&mut self) -> Result<Prototype, ParseError> {
        self.advance()?; // eat 'extern'
        self.parse_prototype()
    }

    /// Parse a bare expression as the body of an anonymous function
    pub fn parse_top_level_expression(&mut self) -> Result<Function, ParseError> {
        let body = self.parse_expression()?;
        Ok(Function::new(Prototype::anonymous(), body))
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::CollectingSink;
    use crate::parser::ast::{Expr, Function, Prototype, ANON_FN_NAME};
    use crate::parser::parse::{ParseError, Parser};
    use crate::parser::precedence::PrecedenceTable;

    fn var(name: &str) -> Expr {
        Expr::Variable(name.to_string())
    }

    #[test]
    fn test_parse_definition() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("def foo(a b) a+b", &table, &mut sink);

        let func = parser.parse_definition().unwrap();
        assert_eq!(
            func,
            Function::new(
                Prototype::new("foo", vec!["a".to_string(), "b".to_string()]),
                Expr::binary('+', var("a"), var("b")),
            )
        );
        assert!(parser.is_at_end());
    }

    #[test]
    fn test_parse_extern() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("extern sin(x)", &table, &mut sink);

        let proto = parser.parse_extern().unwrap();
        assert_eq!(proto.name, "sin");
        assert_eq!(proto.params, vec!["x".to_string()]);
    }

    #[test]
    fn test_parse_prototype_without_params() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("rand() 4", &table, &mut sink);

        let proto = parser.parse_prototype().unwrap();
        assert_eq!(proto, Prototype::new("rand", Vec::new()));
        // Positioned on the token after ')'
        assert!(matches!(parser.current(), crate::parser::lexer::Token::Number(n, _) if *n == 4.0));
    }

    #[test]
    fn test_top_level_expression_is_anonymous() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("1 + x", &table, &mut sink);

        let func = parser.parse_top_level_expression().unwrap();
        assert_eq!(func.proto.name, ANON_FN_NAME);
        assert!(func.proto.params.is_empty());
        assert_eq!(func.body.to_string(), "(1 + x)");
    }

    #[test]
    fn test_missing_function_name() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("def (a) a", &table, &mut sink);

        assert!(matches!(
            parser.parse_definition(),
            Err(ParseError::ExpectedFunctionName { ref found, .. }) if found == "'('"
        ));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_missing_open_paren() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("extern foo a b", &table, &mut sink);

        assert!(matches!(
            parser.parse_extern(),
            Err(ParseError::ExpectedOpenParen { .. })
        ));
    }

    #[test]
    fn test_missing_close_paren_in_prototype() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("def foo(a, b) a", &table, &mut sink);

        match parser.parse_definition() {
            Err(ParseError::ExpectedCloseParen { found, location, .. }) => {
                assert_eq!(found, "','");
                assert_eq!(location.column, 10);
            }
            other => panic!("Expected close paren error, got {:?}", other),
        }
    }

    #[test]
    fn test_definition_body_error_propagates() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("def f(x) (x + 1", &table, &mut sink);

        assert!(matches!(
            parser.parse_definition(),
            Err(ParseError::ExpectedCloseParen { .. })
        ));
        assert_eq!(
            sink.messages(),
            vec!["expected ')' after expression, found end of input"]
        );
    }

    #[test]
    fn test_definition_on_exhausted_stream_is_stable() {
        let table = PrecedenceTable::standard();
        let mut sink = CollectingSink::new();
        let mut parser = Parser::from_source("", &table, &mut sink);

        let first = parser.parse_definition().unwrap_err();
        let second = parser.parse_definition().unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, ParseError::ExpectedFunctionName { .. }));
    }
}
