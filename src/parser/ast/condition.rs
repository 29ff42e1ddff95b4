use crate::{
    lexer::{Terminal, Token},
    parser::{FromTokens, ParseError, ParseState},
};

use super::{BoolExpr, IdentPath, MathExpr, TextExpr};

/// A single condition: a range test, a membership test, a relational
/// comparison, a text match, or a boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Between {
        value: MathExpr,
        low: MathExpr,
        high: MathExpr,
    },
    In {
        lhs: InLhs,
        list: InList,
        negated: bool,
    },
    Relational {
        lhs: MathExpr,
        op: RelOp,
        rhs: MathExpr,
    },
    TextMatch {
        lhs: TextExpr,
        op: TextOp,
        rhs: TextExpr,
    },
    Bool(BoolExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Lte,
    Eq,
    Ne,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Like,
    Ilike,
    NotLike,
    NotIlike,
    Eq,
    Ne,
}

impl TextOp {
    /// Whether the operator asserts a non-match (`!=`, `!~`, `!~~`).
    pub fn is_negated(self) -> bool {
        matches!(self, TextOp::Ne | TextOp::NotLike | TextOp::NotIlike)
    }

    /// Whether the operator folds both sides to lower case (`~~`, `!~~`).
    pub fn is_case_insensitive(self) -> bool {
        matches!(self, TextOp::Ilike | TextOp::NotIlike)
    }
}

/// The left hand side of a membership test, kept in the form it was
/// parsed in.
#[derive(Debug, Clone, PartialEq)]
pub enum InLhs {
    Text(TextExpr),
    Math(MathExpr),
}

/// The right hand side of a membership test: a bracketed list of numeric or
/// text expressions, or an identifier path resolving to a list.
#[derive(Debug, Clone, PartialEq)]
pub enum InList {
    Numbers(Vec<MathExpr>),
    Texts(Vec<TextExpr>),
    Path(IdentPath),
}

impl Condition {
    fn parse_between(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let value = MathExpr::parse(tokens)?;
        tokens.expect(Terminal::Between)?;
        tokens.expect(Terminal::LBracket)?;
        let low = MathExpr::parse(tokens)?;
        tokens.expect(Terminal::Comma)?;
        let high = MathExpr::parse(tokens)?;
        tokens.expect(Terminal::RBracket)?;

        Ok(Condition::Between { value, low, high })
    }

    fn parse_membership_op(tokens: &mut ParseState<Token>) -> Result<bool, ParseError> {
        match tokens.next() {
            Some(Token::In { .. }) => Ok(false),
            Some(Token::NotIn { .. }) => Ok(true),
            Some(token) => Err(ParseError {
                message: format!("expected '>+<' or '<>', found {}", token.describe()),
                position: Some(token.position()),
            }),
            None => Err(ParseError::eof("membership operator")),
        }
    }

    fn parse_in_numbers(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let lhs = InLhs::Math(MathExpr::parse(tokens)?);
        let negated = Self::parse_membership_op(tokens)?;

        tokens.expect(Terminal::LBracket)?;
        let mut items = vec![MathExpr::parse(tokens)?];
        while tokens.next_if(Terminal::Comma).is_some() {
            items.push(MathExpr::parse(tokens)?);
        }
        tokens.expect(Terminal::RBracket)?;

        Ok(Condition::In {
            lhs,
            list: InList::Numbers(items),
            negated,
        })
    }

    fn parse_in_texts(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let lhs = InLhs::Text(TextExpr::parse(tokens)?);
        let negated = Self::parse_membership_op(tokens)?;

        tokens.expect(Terminal::LBracket)?;
        let mut items = vec![TextExpr::parse(tokens)?];
        while tokens.next_if(Terminal::Comma).is_some() {
            items.push(TextExpr::parse(tokens)?);
        }
        tokens.expect(Terminal::RBracket)?;

        Ok(Condition::In {
            lhs,
            list: InList::Texts(items),
            negated,
        })
    }

    fn parse_in_path(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let lhs = InLhs::Text(TextExpr::parse(tokens)?);
        let negated = Self::parse_membership_op(tokens)?;
        let path = IdentPath::parse(tokens)?;

        Ok(Condition::In {
            lhs,
            list: InList::Path(path),
            negated,
        })
    }

    fn parse_relational(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let lhs = MathExpr::parse(tokens)?;

        let op = match tokens.next() {
            Some(Token::LessThan { .. }) => RelOp::Lt,
            Some(Token::LessOrEqual { .. }) => RelOp::Lte,
            Some(Token::Equal { .. }) => RelOp::Eq,
            Some(Token::NotEqual { .. }) => RelOp::Ne,
            Some(Token::GreaterThan { .. }) => RelOp::Gt,
            Some(Token::GreaterOrEqual { .. }) => RelOp::Gte,
            Some(token) => {
                return Err(ParseError {
                    message: format!(
                        "expected a relational operator, found {}",
                        token.describe()
                    ),
                    position: Some(token.position()),
                })
            }
            None => return Err(ParseError::eof("relational operator")),
        };

        let rhs = MathExpr::parse(tokens)?;

        Ok(Condition::Relational { lhs, op, rhs })
    }

    fn parse_text_match(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let lhs = TextExpr::parse(tokens)?;

        let op = match tokens.next() {
            Some(Token::Like { .. }) => TextOp::Like,
            Some(Token::Ilike { .. }) => TextOp::Ilike,
            Some(Token::NotLike { .. }) => TextOp::NotLike,
            Some(Token::NotIlike { .. }) => TextOp::NotIlike,
            Some(Token::Equal { .. }) => TextOp::Eq,
            Some(Token::NotEqual { .. }) => TextOp::Ne,
            Some(token) => {
                return Err(ParseError {
                    message: format!("expected a text operator, found {}", token.describe()),
                    position: Some(token.position()),
                })
            }
            None => return Err(ParseError::eof("text operator")),
        };

        let rhs = TextExpr::parse(tokens)?;

        Ok(Condition::TextMatch { lhs, op, rhs })
    }
}

impl FromTokens<Token> for Condition {
    /// Alternatives are tried in grammar order; the first one consuming a
    /// whole condition wins.
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let checkpoint = tokens.get_index();

        type Alternative = fn(&mut ParseState<Token>) -> Result<Condition, ParseError>;
        let alternatives: [Alternative; 6] = [
            Self::parse_between,
            Self::parse_in_numbers,
            Self::parse_in_texts,
            Self::parse_in_path,
            Self::parse_relational,
            Self::parse_text_match,
        ];

        for alternative in alternatives {
            match alternative(tokens) {
                Ok(condition) => return Ok(condition),
                Err(_) => tokens.set_index(checkpoint),
            }
        }

        BoolExpr::parse(tokens).map(Condition::Bool)
    }
}
