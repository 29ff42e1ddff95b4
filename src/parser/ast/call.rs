use crate::{
    lexer::{Position, Terminal, Token},
    parser::{FromTokens, ParseError, ParseState},
};

use super::{IdentPath, MathExpr, TextExpr};

/// A function call, e.g. `replace(name, 'a', 'b')`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<CallArg>,
    pub position: Position,
}

/// A single call argument. Identifier paths are kept as paths so the raw
/// value reaches the function unchanged. Boolean literals exist for flag
/// arguments such as the case-insensitivity switch of `contains`.
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    Path(IdentPath),
    Text(TextExpr),
    Math(MathExpr),
    Bool(bool),
}

impl FromTokens<Token> for Call {
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let (name, position) = match tokens.next() {
            Some(Token::Id { value, position }) => (value, position),
            Some(token) => {
                return Err(ParseError {
                    message: format!("expected a function name, found {}", token.describe()),
                    position: Some(token.position()),
                })
            }
            None => return Err(ParseError::eof("function call")),
        };

        tokens.expect(Terminal::LParen)?;

        let mut args = vec![];
        if tokens.next_if(Terminal::RParen).is_none() {
            args.push(CallArg::parse(tokens)?);
            while tokens.next_if(Terminal::Comma).is_some() {
                args.push(CallArg::parse(tokens)?);
            }
            tokens.expect(Terminal::RParen)?;
        }

        Ok(Call {
            name,
            args,
            position,
        })
    }
}

impl CallArg {
    fn continues_arithmetic(token: &Token) -> bool {
        matches!(
            token,
            Token::Plus { .. }
                | Token::Minus { .. }
                | Token::Times { .. }
                | Token::Divide { .. }
                | Token::Modulo { .. }
        )
    }
}

impl FromTokens<Token> for CallArg {
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        match tokens.peek() {
            Some(Token::Text { .. }) | Some(Token::Null { .. }) => {
                return Ok(CallArg::Text(TextExpr::parse(tokens)?));
            }
            Some(Token::Integer { .. }) | Some(Token::Float { .. }) => {
                return Ok(CallArg::Math(MathExpr::parse(tokens)?));
            }
            Some(Token::True { .. }) => {
                tokens.next();
                return Ok(CallArg::Bool(true));
            }
            Some(Token::False { .. }) => {
                tokens.next();
                return Ok(CallArg::Bool(false));
            }
            Some(Token::Id { .. }) => {}
            Some(Token::LParen { .. }) => {
                // a parenthesised argument is arithmetic unless it turns out
                // to be a nested text expression
                let checkpoint = tokens.get_index();
                if let Ok(expr) = MathExpr::parse(tokens) {
                    return Ok(CallArg::Math(expr));
                }
                tokens.set_index(checkpoint);
                return Ok(CallArg::Text(TextExpr::parse(tokens)?));
            }
            Some(token) => {
                return Err(ParseError {
                    message: format!(
                        "expected a function argument, found {}",
                        token.describe()
                    ),
                    position: Some(token.position()),
                });
            }
            None => return Err(ParseError::eof("function argument")),
        }

        // starts with an identifier: a nested call, a plain path, or the
        // beginning of an arithmetic expression
        let checkpoint = tokens.get_index();
        let path = IdentPath::parse(tokens)?;

        if path.is_bare() && tokens.peek() == Some(Token::LParen { position: (0, 0) }) {
            tokens.set_index(checkpoint);
            return Ok(CallArg::Text(TextExpr::parse(tokens)?));
        }

        if let Some(token) = tokens.peek() {
            if Self::continues_arithmetic(&token) {
                tokens.set_index(checkpoint);
                return Ok(CallArg::Math(MathExpr::parse(tokens)?));
            }
        }

        Ok(CallArg::Path(path))
    }
}
