//! Parser for the query language.
//!
//! A recursive descent parser over the token stream produced by the lexer.
//! Every AST node knows how to parse itself via [FromTokens]; alternatives
//! are tried in grammar order with backtracking through [ParseState].

pub mod ast;
mod parse_state;

pub use self::parse_state::*;

use log::error;
use std::{error::Error, fmt::Display};

use crate::lexer::{LexError, Position, Token};

use self::ast::Predication;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Option<Position>,
}

impl ParseError {
    pub fn eof(item: impl Display) -> ParseError {
        ParseError {
            message: format!("hit end of query while parsing {item}"),
            position: None,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some((line, col)) => {
                write!(f, "Syntax error at line {line}:{col} - {}", self.message)
            }
            None => write!(f, "Syntax error - {}", self.message),
        }
    }
}

impl Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(value: LexError) -> Self {
        ParseError {
            message: value.message,
            position: Some(value.position),
        }
    }
}

pub trait FromTokens<T> {
    fn parse(tokens: &mut ParseState<T>) -> Result<Self, ParseError>
    where
        Self: Sized;
}

/// Parse a complete query. The whole token stream has to be consumed;
/// trailing tokens are a syntax error.
pub fn parse(tokens: Vec<Token>) -> Result<Predication, Vec<ParseError>> {
    let mut state = ParseState::new(tokens);

    let predication = match Predication::parse(&mut state) {
        Ok(predication) => predication,
        Err(e) => {
            error!("failed to parse query: {e}");
            state.add_error(e);
            return Err(state.errors);
        }
    };

    if let Some(token) = state.peek() {
        let error = ParseError {
            message: format!("unexpected {} after the end of the query", token.describe()),
            position: Some(token.position()),
        };
        error!("failed to parse query: {error}");
        state.add_error(error);
        return Err(state.errors);
    }

    Ok(predication)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_str(input: &str) -> Result<Predication, Vec<ParseError>> {
        let tokens = Lexer::new(input).lex().expect("lexing failed");
        parse(tokens)
    }

    #[test]
    fn test_parse_simple_condition() {
        assert!(parse_str("age == 25").is_ok());
    }

    #[test]
    fn test_parse_rejects_trailing_tokens() {
        let result = parse_str("age >< 10");
        let Err(errors) = result else {
            panic!("expected a parse error");
        };
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_parse_error_mentions_position() {
        let Err(errors) = parse_str("age >< 10") else {
            panic!("expected a parse error");
        };
        assert!(errors[0].position.is_some());
        assert!(format!("{}", errors[0]).starts_with("Syntax error at line 1:"));
    }

    #[test]
    fn test_parse_rejects_empty_token_stream() {
        assert!(parse(vec![]).is_err());
    }
}
