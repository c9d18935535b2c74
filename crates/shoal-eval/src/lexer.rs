//! Expression lexer.
//!
//! Turns one input line into a flat token stream. Every token carries the
//! 0-based character position it starts at, which parse errors report.

use std::fmt;

use shoal_types::eval::ParseError;

/// A single token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier or predeclared name (`true`, `nil`, `len`, ...).
    Ident(String),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// Double-quoted string literal, escapes resolved.
    Str(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `==`.
    Eq,
    /// `!=`.
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `&&`.
    AndAnd,
    /// `||`.
    OrOr,
    /// `!`.
    Not,
    /// `:=`.
    Define,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    /// End-of-input sentinel.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ident(name) => return write!(f, "{name}"),
            Self::Int(n) => return write!(f, "{n}"),
            Self::Float(x) => return write!(f, "{x}"),
            Self::Str(s) => return write!(f, "{s:?}"),
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Not => "!",
            Self::Define => ":=",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Eof => "EOF",
        };
        f.write_str(text)
    }
}

/// A token and the character position it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

/// Lex a whole line. The result always ends with [`Token::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    Lexer::new(source).tokenize()
}

struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            pos: 0,
        }
    }

    fn tokenize(&mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let pos = self.pos;
            let Some(ch) = self.advance() else {
                tokens.push(Spanned {
                    token: Token::Eof,
                    pos,
                });
                return Ok(tokens);
            };
            let token = self.token(ch, pos)?;
            tokens.push(Spanned { token, pos });
        }
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Consume `next` if it is the upcoming character.
    fn eat(&mut self, next: char) -> bool {
        if self.peek() == Some(next) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    // ---------------------------------------------------------------
    // Tokens
    // ---------------------------------------------------------------

    fn token(&mut self, ch: char, start: usize) -> Result<Token, ParseError> {
        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                return self.number(start);
            },
            '.' => Token::Dot,
            '=' if self.eat('=') => Token::Eq,
            '=' => {
                return Err(ParseError::new(
                    start,
                    "assignment is not an expression; use :=",
                ));
            },
            '!' if self.eat('=') => Token::NotEq,
            '!' => Token::Not,
            '<' if self.eat('=') => Token::LtEq,
            '<' => Token::Lt,
            '>' if self.eat('=') => Token::GtEq,
            '>' => Token::Gt,
            '&' if self.eat('&') => Token::AndAnd,
            '|' if self.eat('|') => Token::OrOr,
            ':' if self.eat('=') => Token::Define,
            '"' => return self.string(start),
            c if c.is_ascii_digit() => return self.number(start),
            c if c.is_alphabetic() || c == '_' => return Ok(self.ident(start)),
            c => {
                return Err(ParseError::new(
                    start,
                    format!("illegal character U+{:04X} '{c}'", c as u32),
                ));
            },
        };
        Ok(token)
    }

    fn ident(&mut self, start: usize) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        Token::Ident(self.input[start..self.pos].iter().collect())
    }

    fn number(&mut self, start: usize) -> Result<Token, ParseError> {
        // `start` may already be past a leading digit or a leading dot.
        self.pos = start;
        let mut is_float = false;
        self.digits();
        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += 1 + sign;
                self.digits();
            }
        }

        let text: String = self.input[start..self.pos].iter().collect();
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| ParseError::new(start, format!("malformed float literal {text}")))
        } else {
            text.parse::<i64>().map(Token::Int).map_err(|_| {
                ParseError::new(start, format!("integer literal {text} overflows int"))
            })
        }
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn string(&mut self, start: usize) -> Result<Token, ParseError> {
        let mut text = String::new();
        loop {
            let Some(ch) = self.advance() else {
                return Err(ParseError::new(start, "string literal not terminated"));
            };
            match ch {
                '"' => return Ok(Token::Str(text)),
                '\\' => {
                    let at = self.pos - 1;
                    let escaped = match self.advance() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(_) => return Err(ParseError::new(at, "unknown escape sequence")),
                        None => {
                            return Err(ParseError::new(start, "string literal not terminated"));
                        },
                    };
                    text.push(escaped);
                },
                c => text.push(c),
            }
        }
    }
}
