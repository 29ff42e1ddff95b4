//! The abstract syntax of the query language.
//!
//! One module per node kind; every node parses itself via
//! [FromTokens](crate::parser::FromTokens).

mod bool_expr;
mod call;
mod condition;
mod ident_path;
mod math_expr;
mod predication;
mod text_expr;

pub use self::bool_expr::*;
pub use self::call::*;
pub use self::condition::*;
pub use self::ident_path::*;
pub use self::math_expr::*;
pub use self::predication::*;
pub use self::text_expr::*;
