use crate::error::{CalcError, Span};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    Pipe,
    Comma,
    Equal,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Tilde,
    Bang,

    // Two-character tokens
    SlashSlash,

    // Literals
    Number,
    Identifier,
    Keyword,

    // `;` or newline
    StatementEnd,

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }
}

pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    keywords: HashSet<&'static str>,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        let keywords = HashSet::from([
            "fn",
            "native",
            "sum",
            "\u{03A3}", // sigma symbol
            "pi",
            "\u{03C0}", // pi symbol
            "e",
            "i",
            "product",
            "\u{03A0}", // product symbol
        ]);

        Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            keywords,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, CalcError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            "".to_string(),
            Span::single(self.current),
        ));

        Ok(self.tokens.clone())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), CalcError> {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '|' => self.add_token(TokenType::Pipe),
            ',' => self.add_token(TokenType::Comma),
            '=' => self.add_token(TokenType::Equal),
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '*' => self.add_token(TokenType::Star),
            '^' => self.add_token(TokenType::Caret),
            '~' => self.add_token(TokenType::Tilde),
            '!' => self.add_token(TokenType::Bang),
            '/' => {
                let token_type = if self.match_char('/') {
                    TokenType::SlashSlash
                } else {
                    TokenType::Slash
                };
                self.add_token(token_type);
            }
            ' ' | '\t' | '\r' => {
                // Whitespace is not emitted
            }
            ';' | '\n' => self.add_token(TokenType::StatementEnd),
            c if c.is_ascii_digit() || c == '.' => self.number(c == '.')?,
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => {
                return Err(CalcError::lex_error(
                    Span::single(self.current - c.len_utf8()),
                    format!("Illegal character: '{}'", c),
                ));
            }
        }

        Ok(())
    }

    fn advance(&mut self) -> char {
        if self.current >= self.source.len() {
            return '\0';
        }

        let c = self.source.chars().nth(self.char_count()).unwrap_or('\0');
        self.current += c.len_utf8();
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        if self.current >= self.source.len() {
            return '\0';
        }
        self.source.chars().nth(self.char_count()).unwrap_or('\0')
    }

    fn char_count(&self) -> usize {
        self.source[..self.current].chars().count()
    }

    /// Scans the rest of a number. Numbers are digits with at most one
    /// decimal point; the imaginary unit is a keyword, not a literal suffix,
    /// so every number lexes as real.
    fn number(&mut self, mut has_dot: bool) -> Result<(), CalcError> {
        loop {
            let c = self.peek();
            if c == '.' {
                if has_dot {
                    return Err(CalcError::lex_error(
                        Span::single(self.current),
                        "Illegal character: '.'".to_string(),
                    ));
                }
                has_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.advance();
        }

        let number_slice = &self.source[self.start..self.current];

        if number_slice == "." || number_slice.parse::<f64>().is_err() {
            return Err(CalcError::lex_error(
                Span::new(self.start, self.current),
                format!("Invalid number: {}", number_slice),
            ));
        }

        self.add_token(TokenType::Number);
        Ok(())
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let token_type = if self.keywords.contains(text) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };

        self.add_token(token_type);
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = self.source[self.start..self.current].to_string();
        self.tokens.push(Token::new(
            token_type,
            text,
            Span::new(self.start, self.current),
        ));
    }
}
