//! Crate level error type.
//!
//! The lexer and parser collect syntax errors and surface them together;
//! evaluation fails fast and gets wrapped with the offending query text.

use std::{error::Error as StdError, fmt::Display};

use crate::{evaluator::EvalError, parser::ParseError};

#[derive(Debug)]
pub enum Error {
    /// The caller handed over unusable input: a blank query, or data which
    /// is neither an object tree nor valid JSON.
    Argument(String),
    /// The query does not follow the grammar.
    Parse(Vec<ParseError>),
    /// The query parsed but could not be evaluated.
    Evaluation { query: String, cause: EvalError },
    /// The query evaluated to something other than a boolean.
    ResultType { query: String, message: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Argument(message) => f.write_str(message),
            Error::Parse(errors) => {
                let details = errors
                    .iter()
                    .map(|e| format!("{e}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "Failed to parse query: {details}")
            }
            Error::Evaluation { query, cause } => {
                write!(f, "Error evaluating query '{query}': {cause}")
            }
            Error::ResultType { query, message } => {
                write!(f, "Error evaluating query '{query}': {message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Evaluation { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
