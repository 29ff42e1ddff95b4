use crate::{
    lexer::{Terminal, Token},
    parser::{FromTokens, ParseError, ParseState},
};

use super::{Call, IdentPath};

/// An arithmetic operand or expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MathExpr {
    Integer(i64),
    Float(f64),
    /// `base^exponent`; both sides have to be numeric literals.
    Power {
        base: Box<MathExpr>,
        exponent: Box<MathExpr>,
    },
    Binary {
        op: ArithOp,
        lhs: Box<MathExpr>,
        rhs: Box<MathExpr>,
    },
    Path(IdentPath),
    Call(Call),
    Parens(Box<MathExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl MathExpr {
    /// `+` and `-`, the loosest binding level.
    fn parse_additive(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let mut lhs = Self::parse_multiplicative(tokens)?;

        loop {
            let op = match tokens.peek() {
                Some(Token::Plus { .. }) => ArithOp::Add,
                Some(Token::Minus { .. }) => ArithOp::Sub,
                _ => break,
            };
            tokens.next();

            let rhs = Self::parse_multiplicative(tokens)?;
            lhs = MathExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// `*`, `/` and `%` bind tighter than the additive operators.
    fn parse_multiplicative(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let mut lhs = Self::parse_factor(tokens)?;

        loop {
            let op = match tokens.peek() {
                Some(Token::Times { .. }) => ArithOp::Mul,
                Some(Token::Divide { .. }) => ArithOp::Div,
                Some(Token::Modulo { .. }) => ArithOp::Mod,
                _ => break,
            };
            tokens.next();

            let rhs = Self::parse_factor(tokens)?;
            lhs = MathExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_factor(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        match tokens.peek() {
            Some(Token::Integer { .. }) | Some(Token::Float { .. }) => {
                let base = Self::parse_number(tokens)?;

                // the power form only chains two numeric literals
                if tokens.next_if(Terminal::Caret).is_some() {
                    let exponent = Self::parse_number(tokens)?;
                    return Ok(MathExpr::Power {
                        base: Box::new(base),
                        exponent: Box::new(exponent),
                    });
                }

                Ok(base)
            }
            Some(Token::LParen { .. }) => {
                tokens.next();
                let inner = MathExpr::parse(tokens)?;
                tokens.expect(Terminal::RParen)?;
                Ok(MathExpr::Parens(Box::new(inner)))
            }
            Some(Token::Id { .. }) => {
                let checkpoint = tokens.get_index();
                tokens.next();

                if tokens.peek() == Some(Token::LParen { position: (0, 0) }) {
                    tokens.set_index(checkpoint);
                    return Ok(MathExpr::Call(Call::parse(tokens)?));
                }

                tokens.set_index(checkpoint);
                Ok(MathExpr::Path(IdentPath::parse(tokens)?))
            }
            Some(token) => Err(ParseError {
                message: format!(
                    "expected an arithmetic expression, found {}",
                    token.describe()
                ),
                position: Some(token.position()),
            }),
            None => Err(ParseError::eof("arithmetic expression")),
        }
    }

    fn parse_number(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        match tokens.next() {
            Some(Token::Integer { value, position }) => {
                let value = i64::try_from(value).map_err(|_| ParseError {
                    message: format!("integer literal '{value}' is out of range"),
                    position: Some(position),
                })?;
                Ok(MathExpr::Integer(value))
            }
            Some(Token::Float { value, .. }) => Ok(MathExpr::Float(value)),
            Some(token) => Err(ParseError {
                message: format!("expected a number, found {}", token.describe()),
                position: Some(token.position()),
            }),
            None => Err(ParseError::eof("number")),
        }
    }
}

impl FromTokens<Token> for MathExpr {
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        Self::parse_additive(tokens)
    }
}
