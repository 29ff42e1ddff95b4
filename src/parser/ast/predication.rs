use crate::{
    lexer::{Terminal, Token},
    parser::{FromTokens, ParseError, ParseState},
};

use super::Condition;

/// A boolean expression tree over conditions. `AND` and `OR` share one
/// precedence level and associate to the left, exactly as the grammar is
/// written: `a OR b AND c` is `(a OR b) AND c`. Parentheses regroup.
#[derive(Debug, Clone, PartialEq)]
pub enum Predication {
    And(Box<Predication>, Box<Predication>),
    Or(Box<Predication>, Box<Predication>),
    Condition(Box<Condition>),
}

impl Predication {
    /// Tokens which can only continue an expression, never follow a closed
    /// predication. Seeing one of these after `(...)` means the parentheses
    /// belonged to an operand, not to a grouped predication.
    fn continues_expression(token: &Token) -> bool {
        matches!(
            token,
            Token::Plus { .. }
                | Token::Minus { .. }
                | Token::Times { .. }
                | Token::Divide { .. }
                | Token::Modulo { .. }
                | Token::Caret { .. }
                | Token::Equal { .. }
                | Token::NotEqual { .. }
                | Token::LessThan { .. }
                | Token::LessOrEqual { .. }
                | Token::GreaterThan { .. }
                | Token::GreaterOrEqual { .. }
                | Token::Between { .. }
                | Token::In { .. }
                | Token::NotIn { .. }
                | Token::Like { .. }
                | Token::Ilike { .. }
                | Token::NotLike { .. }
                | Token::NotIlike { .. }
        )
    }

    fn parse_operand(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        if tokens.peek() == Some(Token::LParen { position: (0, 0) }) {
            let checkpoint = tokens.get_index();
            tokens.next();

            if let Ok(inner) = Predication::parse(tokens) {
                if tokens.next_if(Terminal::RParen).is_some() {
                    let grouped_cleanly = tokens
                        .peek()
                        .map(|token| !Self::continues_expression(&token))
                        .unwrap_or(true);
                    if grouped_cleanly {
                        return Ok(inner);
                    }
                }
            }

            tokens.set_index(checkpoint);
        }

        Condition::parse(tokens).map(|condition| Predication::Condition(Box::new(condition)))
    }
}

impl FromTokens<Token> for Predication {
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let mut lhs = Self::parse_operand(tokens)?;

        loop {
            match tokens.peek() {
                Some(Token::And { .. }) => {
                    tokens.next();
                    let rhs = Self::parse_operand(tokens)?;
                    lhs = Predication::And(Box::new(lhs), Box::new(rhs));
                }
                Some(Token::Or { .. }) => {
                    tokens.next();
                    let rhs = Self::parse_operand(tokens)?;
                    lhs = Predication::Or(Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }

        Ok(lhs)
    }
}
