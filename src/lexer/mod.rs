//! Lexer for the query language.
//!
//! Turns a query string into a token stream, tracking line/column positions
//! for error reporting. Operators come in a symbolic and an alphabetic
//! spelling; the alphabetic ones are only recognised as whole words.

mod token;

pub use token::*;

use lazy_static::lazy_static;
use std::{collections::HashMap, error::Error, fmt::Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

pub type LexResult<T> = Result<T, LexError>;

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (line, col) = self.position;
        write!(f, "Syntax error at line {line}:{col} - {}", self.message)
    }
}

impl Error for LexError {}

/// Characters allowed inside a quoted text literal, besides letters, digits
/// and spaces.
const TEXT_SIGNS: &str = ".+()/%#\\@";

#[derive(Debug, Clone, Default)]
struct LexMap {
    map: HashMap<&'static str, Terminal>,
}

impl LexMap {
    pub fn insert(&mut self, key: &'static str, value: Terminal) {
        self.map.insert(key, value);
    }

    /// Whether any known spelling starts with `key`. Used for the
    /// longest-match scan over operator characters.
    pub fn can_match(&self, key: &str) -> bool {
        self.map.keys().any(|map_key| map_key.starts_with(key))
    }

    pub fn get(&self, key: &str) -> Option<Terminal> {
        self.map.get(key).copied()
    }
}

macro_rules! terminal {
    ($map:ident, $name:ident, $value:expr) => {
        $map.insert($value, Terminal::$name);
    };
}

lazy_static! {
    /// All fixed symbolic spellings. Longest match wins, so `>=<` beats `>=`
    /// and `!~~` beats `!~`.
    static ref LEX_MAP: LexMap = {
        let mut m = LexMap::default();

        terminal!(m, LParen, "(");
        terminal!(m, RParen, ")");
        terminal!(m, LBracket, "[");
        terminal!(m, RBracket, "]");
        terminal!(m, Comma, ",");
        terminal!(m, Dot, ".");
        terminal!(m, Plus, "+");
        terminal!(m, Minus, "-");
        terminal!(m, Times, "*");
        terminal!(m, Divide, "/");
        terminal!(m, Modulo, "%");
        terminal!(m, Caret, "^");
        terminal!(m, Equal, "==");
        terminal!(m, NotEqual, "!=");
        terminal!(m, LessThan, "<");
        terminal!(m, LessOrEqual, "<=");
        terminal!(m, GreaterThan, ">");
        terminal!(m, GreaterOrEqual, ">=");
        terminal!(m, Between, ">=<");
        terminal!(m, In, ">+<");
        terminal!(m, NotIn, "<>");
        terminal!(m, Like, "~");
        terminal!(m, Ilike, "~~");
        terminal!(m, NotLike, "!~");
        terminal!(m, NotIlike, "!~~");

        m
    };

    /// Alphabetic operator spellings. These are case sensitive, unlike the
    /// logical keywords and literals.
    static ref WORD_OPERATORS: HashMap<&'static str, Terminal> = {
        let mut m = HashMap::new();

        m.insert("EQ", Terminal::Equal);
        m.insert("NE", Terminal::NotEqual);
        m.insert("LT", Terminal::LessThan);
        m.insert("LTE", Terminal::LessOrEqual);
        m.insert("GT", Terminal::GreaterThan);
        m.insert("GTE", Terminal::GreaterOrEqual);
        m.insert("BETWEEN", Terminal::Between);
        m.insert("IN", Terminal::In);
        m.insert("LIKE", Terminal::Like);
        m.insert("ILIKE", Terminal::Ilike);

        m
    };
}

#[derive(Debug, Clone)]
pub struct Lexer {
    tokens: Vec<Token>,
    chars: Vec<char>,
    position: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            tokens: vec![],
            chars: input.chars().collect(),
            position: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn next(&mut self) -> Option<char> {
        let item = self.chars.get(self.position).copied();
        if item.is_some() {
            self.position += 1;
            self.col += 1;
        }
        item
    }

    fn eat_whitespace(&mut self) {
        while let Some(next) = self.peek() {
            match next {
                ' ' | '\t' | '\r' => {
                    self.position += 1;
                    self.col += 1;
                }
                '\n' => {
                    self.position += 1;
                    self.col = 1;
                    self.line += 1;
                }
                _ => return,
            }
        }
    }

    fn error(&self, message: impl ToString, position: Position) -> LexError {
        LexError {
            message: message.to_string(),
            position,
        }
    }

    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        loop {
            self.eat_whitespace();

            let Some(next) = self.peek() else {
                return Ok(self.tokens);
            };

            match next {
                'a'..='z' | 'A'..='Z' | '_' | '$' => self.lex_word()?,
                '0'..='9' => self.lex_number()?,
                '\'' | '"' => self.lex_text()?,
                '@' => self.lex_instance_tag()?,
                _ => self.lex_special()?,
            };
        }
    }

    /// Lex a run of operator characters via longest match against [LEX_MAP].
    fn lex_special(&mut self) -> LexResult<()> {
        let mut stack = String::new();

        let position = (self.line, self.col);

        while let Some(next) = self.next() {
            stack.push(next);

            let can_read_next = self
                .peek()
                .map(|item| {
                    let mut read = stack.clone();
                    read.push(item);
                    LEX_MAP.can_match(&read)
                })
                .unwrap_or(false);

            if can_read_next {
                continue;
            }

            let Some(current_match) = LEX_MAP.get(&stack) else {
                return Err(self.error(format!("failed to lex '{stack}'"), position));
            };

            self.tokens.push(current_match.to_token(position));
            return Ok(());
        }

        Err(self.error("unexpected end of input", position))
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();

        if self.peek() == Some('$') {
            word.push('$');
            self.next();
        }

        while let Some(next) = self.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                word.push(next);
                self.next();
            } else {
                break;
            }
        }

        word
    }

    fn lex_word(&mut self) -> LexResult<()> {
        let position = (self.line, self.col);
        let word = self.read_word();

        // logical keywords and literals are case insensitive
        let token = match word.to_ascii_uppercase().as_str() {
            "AND" => Some(Terminal::And),
            "OR" => Some(Terminal::Or),
            "TRUE" => Some(Terminal::True),
            "FALSE" => Some(Terminal::False),
            "NULL" => Some(Terminal::Null),
            _ => None,
        };
        if let Some(terminal) = token {
            self.tokens.push(terminal.to_token(position));
            return Ok(());
        }

        if word == "NOT" {
            return self.lex_negated_operator(position);
        }

        if let Some(terminal) = WORD_OPERATORS.get(word.as_str()) {
            self.tokens.push(terminal.to_token(position));
            return Ok(());
        }

        self.tokens.push(Token::Id {
            value: word,
            position,
        });
        Ok(())
    }

    /// `NOT` only exists as the first half of `NOT IN`, `NOT LIKE` and
    /// `NOT ILIKE`. A lone `NOT` falls back to being an identifier.
    fn lex_negated_operator(&mut self, position: Position) -> LexResult<()> {
        let checkpoint = (self.position, self.line, self.col);

        self.eat_whitespace();
        let word = self.read_word();

        let terminal = match word.as_str() {
            "IN" => Some(Terminal::NotIn),
            "LIKE" => Some(Terminal::NotLike),
            "ILIKE" => Some(Terminal::NotIlike),
            _ => None,
        };

        match terminal {
            Some(terminal) => self.tokens.push(terminal.to_token(position)),
            None => {
                (self.position, self.line, self.col) = checkpoint;
                self.tokens.push(Token::Id {
                    value: "NOT".into(),
                    position,
                });
            }
        }

        Ok(())
    }

    fn lex_number(&mut self) -> LexResult<()> {
        let position = (self.line, self.col);
        let mut stack = String::new();

        while let Some(next) = self.peek() {
            if next.is_ascii_digit() {
                stack.push(next);
                self.next();
            } else {
                break;
            }
        }

        // a dot directly followed by a digit makes this a float; a lone dot
        // belongs to an identifier path instead
        let is_float = self.peek() == Some('.')
            && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false);

        if is_float {
            stack.push('.');
            self.next();
            while let Some(next) = self.peek() {
                if next.is_ascii_digit() {
                    stack.push(next);
                    self.next();
                } else {
                    break;
                }
            }

            let value = stack
                .parse::<f64>()
                .map_err(|_| self.error(format!("invalid number '{stack}'"), position))?;
            self.tokens.push(Token::Float { value, position });
        } else {
            let value = stack
                .parse::<u64>()
                .map_err(|_| self.error(format!("invalid number '{stack}'"), position))?;
            self.tokens.push(Token::Integer { value, position });
        }

        Ok(())
    }

    fn lex_text(&mut self) -> LexResult<()> {
        let position = (self.line, self.col);
        let Some(quote) = self.next() else {
            return Err(self.error("unexpected end of input", position));
        };

        let mut value = String::new();

        loop {
            let char_position = (self.line, self.col);
            let Some(next) = self.next() else {
                return Err(self.error("unterminated text literal", position));
            };

            if next == quote {
                break;
            }

            if next.is_alphanumeric() || next == ' ' || TEXT_SIGNS.contains(next) {
                value.push(next);
            } else {
                return Err(self.error(
                    format!("unexpected character '{next}' in text literal"),
                    char_position,
                ));
            }
        }

        self.tokens.push(Token::Text { value, position });
        Ok(())
    }

    fn lex_instance_tag(&mut self) -> LexResult<()> {
        let position = (self.line, self.col);
        self.next();

        let mut value = String::new();
        while let Some(next) = self.peek() {
            if next.is_ascii_alphabetic() {
                value.push(next);
                self.next();
            } else {
                break;
            }
        }

        if value.is_empty() {
            return Err(self.error("expected a name after '@'", position));
        }

        self.tokens.push(Token::InstanceTag { value, position });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        Lexer::new(input).lex().expect("lexing failed")
    }

    #[test]
    fn test_lex_identifier() {
        assert_eq!(
            vec![Token::Id {
                value: "status".into(),
                position: (1, 1)
            }],
            kinds("status")
        );
    }

    #[test]
    fn test_lex_dollar_identifier() {
        assert_eq!(
            vec![Token::Id {
                value: "$item".into(),
                position: (1, 1)
            }],
            kinds("$item")
        );
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(
            vec![
                Token::Integer {
                    value: 42,
                    position: (1, 1)
                },
                Token::Float {
                    value: 1.5,
                    position: (1, 4)
                }
            ],
            kinds("42 1.5")
        );
    }

    #[test]
    fn test_lex_path_with_dots_is_not_a_float() {
        let tokens = kinds("a.b");
        assert_eq!(
            vec![
                Token::Id {
                    value: "a".into(),
                    position: (1, 1)
                },
                Token::Dot { position: (1, 2) },
                Token::Id {
                    value: "b".into(),
                    position: (1, 3)
                }
            ],
            tokens
        );
    }

    #[test]
    fn test_longest_match_wins() {
        assert_eq!(vec![Token::Between { position: (1, 1) }], kinds(">=<"));
        assert_eq!(vec![Token::GreaterOrEqual { position: (1, 1) }], kinds(">="));
        assert_eq!(vec![Token::In { position: (1, 1) }], kinds(">+<"));
        assert_eq!(vec![Token::NotIn { position: (1, 1) }], kinds("<>"));
        assert_eq!(vec![Token::NotIlike { position: (1, 1) }], kinds("!~~"));
        assert_eq!(vec![Token::Ilike { position: (1, 1) }], kinds("~~"));
    }

    #[test]
    fn test_adjacent_operators_split_correctly() {
        assert_eq!(
            vec![
                Token::GreaterThan { position: (1, 1) },
                Token::LessThan { position: (1, 2) }
            ],
            kinds("><")
        );
    }

    #[test]
    fn test_alphabetic_spellings() {
        assert_eq!(vec![Token::Equal { position: (1, 1) }], kinds("EQ"));
        assert_eq!(vec![Token::Between { position: (1, 1) }], kinds("BETWEEN"));
        assert_eq!(vec![Token::NotIn { position: (1, 1) }], kinds("NOT IN"));
        assert_eq!(vec![Token::NotLike { position: (1, 1) }], kinds("NOT LIKE"));
        assert_eq!(
            vec![Token::NotIlike { position: (1, 1) }],
            kinds("NOT ILIKE")
        );
    }

    #[test]
    fn test_alphabetic_spellings_are_case_sensitive() {
        // lowercase forms are plain identifiers
        assert_eq!(
            vec![Token::Id {
                value: "eq".into(),
                position: (1, 1)
            }],
            kinds("eq")
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(vec![Token::And { position: (1, 1) }], kinds("and"));
        assert_eq!(vec![Token::Or { position: (1, 1) }], kinds("Or"));
        assert_eq!(vec![Token::True { position: (1, 1) }], kinds("True"));
        assert_eq!(vec![Token::Null { position: (1, 1) }], kinds("null"));
    }

    #[test]
    fn test_lone_not_is_an_identifier() {
        assert_eq!(
            vec![
                Token::Id {
                    value: "NOT".into(),
                    position: (1, 1)
                },
                Token::Id {
                    value: "ready".into(),
                    position: (1, 5)
                }
            ],
            kinds("NOT ready")
        );
    }

    #[test]
    fn test_lex_text_literal() {
        assert_eq!(
            vec![Token::Text {
                value: "John%".into(),
                position: (1, 1)
            }],
            kinds("'John%'")
        );
        assert_eq!(
            vec![Token::Text {
                value: "Hello World".into(),
                position: (1, 1)
            }],
            kinds("\"Hello World\"")
        );
    }

    #[test]
    fn test_unterminated_text_literal() {
        let result = Lexer::new("'oops").lex();
        assert!(result.is_err());
    }

    #[test]
    fn test_lex_instance_tag() {
        assert_eq!(
            vec![Token::InstanceTag {
                value: "first".into(),
                position: (1, 1)
            }],
            kinds("@first")
        );
    }

    #[test]
    fn test_lex_error_carries_position() {
        let result = Lexer::new("age ? 1").lex();
        let Err(error) = result else {
            panic!("expected a lex error");
        };
        assert_eq!((1, 5), error.position);
    }

    #[test]
    fn test_lex_full_condition() {
        let tokens = kinds("age >=< [18, 65]");
        assert_eq!(
            vec![
                Token::Id {
                    value: "age".into(),
                    position: (1, 1)
                },
                Token::Between { position: (1, 5) },
                Token::LBracket { position: (1, 9) },
                Token::Integer {
                    value: 18,
                    position: (1, 10)
                },
                Token::Comma { position: (1, 12) },
                Token::Integer {
                    value: 65,
                    position: (1, 14)
                },
                Token::RBracket { position: (1, 16) }
            ],
            tokens
        );
    }
}
