use crate::{
    lexer::{Terminal, Token},
    parser::{FromTokens, ParseError, ParseState},
};

use super::{Call, IdentPath};

/// A textual operand: a quoted literal, an identifier path, a call, the
/// `NULL` literal, or a parenthesised text expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TextExpr {
    Literal(String),
    Path(IdentPath),
    Call(Call),
    Null,
    Parens(Box<TextExpr>),
}

impl TextExpr {
    /// Whether this expression is the literal `NULL` keyword (possibly in
    /// parentheses). Text matching treats the literal differently from a
    /// value which merely resolves to null.
    pub fn is_literal_null(&self) -> bool {
        match self {
            TextExpr::Null => true,
            TextExpr::Parens(inner) => inner.is_literal_null(),
            _ => false,
        }
    }
}

impl FromTokens<Token> for TextExpr {
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        match tokens.peek() {
            Some(Token::Text { .. }) => {
                let Some(Token::Text { value, .. }) = tokens.next() else {
                    unreachable!()
                };
                Ok(TextExpr::Literal(value))
            }
            Some(Token::Null { .. }) => {
                tokens.next();
                Ok(TextExpr::Null)
            }
            Some(Token::LParen { .. }) => {
                tokens.next();
                let inner = TextExpr::parse(tokens)?;
                tokens.expect(Terminal::RParen)?;
                Ok(TextExpr::Parens(Box::new(inner)))
            }
            Some(Token::Id { .. }) => {
                let checkpoint = tokens.get_index();
                tokens.next();

                if tokens.peek() == Some(Token::LParen { position: (0, 0) }) {
                    tokens.set_index(checkpoint);
                    return Ok(TextExpr::Call(Call::parse(tokens)?));
                }

                tokens.set_index(checkpoint);
                Ok(TextExpr::Path(IdentPath::parse(tokens)?))
            }
            Some(token) => Err(ParseError {
                message: format!("expected a text expression, found {}", token.describe()),
                position: Some(token.position()),
            }),
            None => Err(ParseError::eof("text expression")),
        }
    }
}
