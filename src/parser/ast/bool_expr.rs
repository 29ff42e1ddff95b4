use crate::{
    lexer::{Terminal, Token},
    parser::{FromTokens, ParseError, ParseState},
};

use super::{Call, IdentPath};

/// A boolean operand: a literal, an identifier path, a call, an equality
/// chain over those, or a parenthesised boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    Lit(bool),
    Path(IdentPath),
    Call(Call),
    Compare {
        op: EqOp,
        lhs: Box<BoolExpr>,
        rhs: Box<BoolExpr>,
    },
    Parens(Box<BoolExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqOp {
    Eq,
    Ne,
}

impl BoolExpr {
    fn parse_primary(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        match tokens.peek() {
            Some(Token::True { .. }) => {
                tokens.next();
                Ok(BoolExpr::Lit(true))
            }
            Some(Token::False { .. }) => {
                tokens.next();
                Ok(BoolExpr::Lit(false))
            }
            Some(Token::LParen { .. }) => {
                tokens.next();
                let inner = BoolExpr::parse(tokens)?;
                tokens.expect(Terminal::RParen)?;
                Ok(BoolExpr::Parens(Box::new(inner)))
            }
            Some(Token::Id { .. }) => {
                let checkpoint = tokens.get_index();
                tokens.next();

                if tokens.peek() == Some(Token::LParen { position: (0, 0) }) {
                    tokens.set_index(checkpoint);
                    return Ok(BoolExpr::Call(Call::parse(tokens)?));
                }

                tokens.set_index(checkpoint);
                Ok(BoolExpr::Path(IdentPath::parse(tokens)?))
            }
            Some(token) => Err(ParseError {
                message: format!("expected a boolean expression, found {}", token.describe()),
                position: Some(token.position()),
            }),
            None => Err(ParseError::eof("boolean expression")),
        }
    }
}

impl FromTokens<Token> for BoolExpr {
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let mut lhs = Self::parse_primary(tokens)?;

        loop {
            let op = match tokens.peek() {
                Some(Token::Equal { .. }) => EqOp::Eq,
                Some(Token::NotEqual { .. }) => EqOp::Ne,
                _ => break,
            };
            tokens.next();

            let rhs = Self::parse_primary(tokens)?;
            lhs = BoolExpr::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }
}
