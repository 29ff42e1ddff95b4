use std::fmt::Display;

use crate::{
    lexer::{Position, Terminal, Token},
    parser::{FromTokens, ParseError, ParseState},
};

/// A dotted identifier path such as `person.orders[1].total`, naming a
/// location in the data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentPath {
    pub segments: Vec<PathSegment>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<PathIndex>,
}

/// An index step after a segment: either a literal list position or an
/// `@name` instance tag resolved through a host-supplied table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathIndex {
    Position(usize),
    Instance(String),
}

impl IdentPath {
    /// Whether this path is a bare name, i.e. a single segment without an
    /// index step. Only those can be function names.
    pub fn is_bare(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].index.is_none()
    }

    fn parse_segment(tokens: &mut ParseState<Token>) -> Result<PathSegment, ParseError> {
        let name = match tokens.next() {
            Some(Token::Id { value, .. }) => value,
            Some(token) => {
                return Err(ParseError {
                    message: format!("expected an identifier, found {}", token.describe()),
                    position: Some(token.position()),
                })
            }
            None => return Err(ParseError::eof("identifier")),
        };

        let mut index = None;
        if tokens.next_if(Terminal::LBracket).is_some() {
            index = Some(Self::parse_index(tokens)?);
            tokens.expect(Terminal::RBracket)?;
        }

        Ok(PathSegment { name, index })
    }

    fn parse_index(tokens: &mut ParseState<Token>) -> Result<PathIndex, ParseError> {
        match tokens.next() {
            Some(Token::Integer { value, .. }) => Ok(PathIndex::Position(value as usize)),
            Some(Token::InstanceTag { value, .. }) => Ok(PathIndex::Instance(value)),
            Some(token) => Err(ParseError {
                message: format!(
                    "expected a list index or instance tag, found {}",
                    token.describe()
                ),
                position: Some(token.position()),
            }),
            None => Err(ParseError::eof("list index")),
        }
    }
}

impl FromTokens<Token> for IdentPath {
    fn parse(tokens: &mut ParseState<Token>) -> Result<Self, ParseError> {
        let position = match tokens.peek() {
            Some(token) => token.position(),
            None => return Err(ParseError::eof("identifier path")),
        };

        let mut segments = vec![Self::parse_segment(tokens)?];

        while tokens.next_if(Terminal::Dot).is_some() {
            segments.push(Self::parse_segment(tokens)?);
        }

        Ok(IdentPath { segments, position })
    }
}

impl Display for IdentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.name)?;
            match &segment.index {
                Some(PathIndex::Position(index)) => write!(f, "[{index}]")?,
                Some(PathIndex::Instance(tag)) => write!(f, "[@{tag}]")?,
                None => {}
            }
        }
        Ok(())
    }
}
