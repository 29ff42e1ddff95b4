pub type Position = (usize, usize);

/// A single token of the query language, carrying its source position.
#[derive(Debug, Clone)]
pub enum Token {
    LParen { position: Position },
    RParen { position: Position },
    LBracket { position: Position },
    RBracket { position: Position },
    Comma { position: Position },
    Dot { position: Position },
    Plus { position: Position },
    Minus { position: Position },
    Times { position: Position },
    Divide { position: Position },
    Modulo { position: Position },
    Caret { position: Position },
    Equal { position: Position },
    NotEqual { position: Position },
    LessThan { position: Position },
    LessOrEqual { position: Position },
    GreaterThan { position: Position },
    GreaterOrEqual { position: Position },
    Between { position: Position },
    In { position: Position },
    NotIn { position: Position },
    Like { position: Position },
    Ilike { position: Position },
    NotLike { position: Position },
    NotIlike { position: Position },
    And { position: Position },
    Or { position: Position },
    True { position: Position },
    False { position: Position },
    Null { position: Position },
    Integer { value: u64, position: Position },
    Float { value: f64, position: Position },
    Text { value: String, position: Position },
    Id { value: String, position: Position },
    InstanceTag { value: String, position: Position },
}

/// Fixed-spelling token kinds, i.e. everything which does not carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Plus,
    Minus,
    Times,
    Divide,
    Modulo,
    Caret,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Between,
    In,
    NotIn,
    Like,
    Ilike,
    NotLike,
    NotIlike,
    And,
    Or,
    True,
    False,
    Null,
}

impl Terminal {
    pub fn to_token(self, position: Position) -> Token {
        match self {
            Terminal::LParen => Token::LParen { position },
            Terminal::RParen => Token::RParen { position },
            Terminal::LBracket => Token::LBracket { position },
            Terminal::RBracket => Token::RBracket { position },
            Terminal::Comma => Token::Comma { position },
            Terminal::Dot => Token::Dot { position },
            Terminal::Plus => Token::Plus { position },
            Terminal::Minus => Token::Minus { position },
            Terminal::Times => Token::Times { position },
            Terminal::Divide => Token::Divide { position },
            Terminal::Modulo => Token::Modulo { position },
            Terminal::Caret => Token::Caret { position },
            Terminal::Equal => Token::Equal { position },
            Terminal::NotEqual => Token::NotEqual { position },
            Terminal::LessThan => Token::LessThan { position },
            Terminal::LessOrEqual => Token::LessOrEqual { position },
            Terminal::GreaterThan => Token::GreaterThan { position },
            Terminal::GreaterOrEqual => Token::GreaterOrEqual { position },
            Terminal::Between => Token::Between { position },
            Terminal::In => Token::In { position },
            Terminal::NotIn => Token::NotIn { position },
            Terminal::Like => Token::Like { position },
            Terminal::Ilike => Token::Ilike { position },
            Terminal::NotIlike => Token::NotIlike { position },
            Terminal::NotLike => Token::NotLike { position },
            Terminal::And => Token::And { position },
            Terminal::Or => Token::Or { position },
            Terminal::True => Token::True { position },
            Terminal::False => Token::False { position },
            Terminal::Null => Token::Null { position },
        }
    }
}

impl PartialEq<Token> for Terminal {
    fn eq(&self, other: &Token) -> bool {
        matches!(
            (self, other),
            (Terminal::LParen, Token::LParen { .. })
                | (Terminal::RParen, Token::RParen { .. })
                | (Terminal::LBracket, Token::LBracket { .. })
                | (Terminal::RBracket, Token::RBracket { .. })
                | (Terminal::Comma, Token::Comma { .. })
                | (Terminal::Dot, Token::Dot { .. })
                | (Terminal::Plus, Token::Plus { .. })
                | (Terminal::Minus, Token::Minus { .. })
                | (Terminal::Times, Token::Times { .. })
                | (Terminal::Divide, Token::Divide { .. })
                | (Terminal::Modulo, Token::Modulo { .. })
                | (Terminal::Caret, Token::Caret { .. })
                | (Terminal::Equal, Token::Equal { .. })
                | (Terminal::NotEqual, Token::NotEqual { .. })
                | (Terminal::LessThan, Token::LessThan { .. })
                | (Terminal::LessOrEqual, Token::LessOrEqual { .. })
                | (Terminal::GreaterThan, Token::GreaterThan { .. })
                | (Terminal::GreaterOrEqual, Token::GreaterOrEqual { .. })
                | (Terminal::Between, Token::Between { .. })
                | (Terminal::In, Token::In { .. })
                | (Terminal::NotIn, Token::NotIn { .. })
                | (Terminal::Like, Token::Like { .. })
                | (Terminal::Ilike, Token::Ilike { .. })
                | (Terminal::NotLike, Token::NotLike { .. })
                | (Terminal::NotIlike, Token::NotIlike { .. })
                | (Terminal::And, Token::And { .. })
                | (Terminal::Or, Token::Or { .. })
                | (Terminal::True, Token::True { .. })
                | (Terminal::False, Token::False { .. })
                | (Terminal::Null, Token::Null { .. })
        )
    }
}

// Tokens compare by kind only; the carried values are irrelevant for
// matching against the grammar.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Eq for Token {}

impl Token {
    pub fn position(&self) -> Position {
        match self {
            Token::LParen { position }
            | Token::RParen { position }
            | Token::LBracket { position }
            | Token::RBracket { position }
            | Token::Comma { position }
            | Token::Dot { position }
            | Token::Plus { position }
            | Token::Minus { position }
            | Token::Times { position }
            | Token::Divide { position }
            | Token::Modulo { position }
            | Token::Caret { position }
            | Token::Equal { position }
            | Token::NotEqual { position }
            | Token::LessThan { position }
            | Token::LessOrEqual { position }
            | Token::GreaterThan { position }
            | Token::GreaterOrEqual { position }
            | Token::Between { position }
            | Token::In { position }
            | Token::NotIn { position }
            | Token::Like { position }
            | Token::Ilike { position }
            | Token::NotLike { position }
            | Token::NotIlike { position }
            | Token::And { position }
            | Token::Or { position }
            | Token::True { position }
            | Token::False { position }
            | Token::Null { position }
            | Token::Integer { position, .. }
            | Token::Float { position, .. }
            | Token::Text { position, .. }
            | Token::Id { position, .. }
            | Token::InstanceTag { position, .. } => *position,
        }
    }

    /// Human readable rendition for error messages.
    pub fn describe(&self) -> String {
        let spelling = match self {
            Token::Integer { value, .. } => return format!("number '{value}'"),
            Token::Float { value, .. } => return format!("number '{value}'"),
            Token::Text { value, .. } => return format!("text '{value}'"),
            Token::Id { value, .. } => return format!("identifier '{value}'"),
            Token::InstanceTag { value, .. } => return format!("instance tag '@{value}'"),
            Token::LParen { .. } => "(",
            Token::RParen { .. } => ")",
            Token::LBracket { .. } => "[",
            Token::RBracket { .. } => "]",
            Token::Comma { .. } => ",",
            Token::Dot { .. } => ".",
            Token::Plus { .. } => "+",
            Token::Minus { .. } => "-",
            Token::Times { .. } => "*",
            Token::Divide { .. } => "/",
            Token::Modulo { .. } => "%",
            Token::Caret { .. } => "^",
            Token::Equal { .. } => "==",
            Token::NotEqual { .. } => "!=",
            Token::LessThan { .. } => "<",
            Token::LessOrEqual { .. } => "<=",
            Token::GreaterThan { .. } => ">",
            Token::GreaterOrEqual { .. } => ">=",
            Token::Between { .. } => ">=<",
            Token::In { .. } => ">+<",
            Token::NotIn { .. } => "<>",
            Token::Like { .. } => "~",
            Token::Ilike { .. } => "~~",
            Token::NotLike { .. } => "!~",
            Token::NotIlike { .. } => "!~~",
            Token::And { .. } => "AND",
            Token::Or { .. } => "OR",
            Token::True { .. } => "TRUE",
            Token::False { .. } => "FALSE",
            Token::Null { .. } => "NULL",
        };

        format!("'{spelling}'")
    }
}
