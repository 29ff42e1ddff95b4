//! ObjectQL, an embeddable boolean query language for tree-shaped data.
//!
//! A host hands over a data tree (or a JSON document) and a query string and
//! gets a single boolean back:
//!
//! ```
//! use objectql::evaluate_json;
//!
//! let data = r#"{"age": 25, "status": "active"}"#;
//! let result = evaluate_json(data, "age >=< [18, 65] AND status == 'active'").unwrap();
//! assert!(result);
//! ```
//!
//! For repeated queries against the same data (or to register custom
//! functions), keep an [Evaluator] around instead.

pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod value;

pub use self::error::Error;
pub use self::evaluator::Evaluator;
pub use self::functions::{FunctionResult, FunctionRegistry};
pub use self::value::Value;

/// Evaluate a query against a data tree with a default evaluator.
pub fn evaluate(root: Value, query: &str) -> Result<bool, Error> {
    Evaluator::new(root).evaluate(query)
}

/// Evaluate a query against a JSON document with a default evaluator.
pub fn evaluate_json(json: &str, query: &str) -> Result<bool, Error> {
    Evaluator::from_json(json)?.evaluate(query)
}
