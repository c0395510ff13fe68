use tracing::trace;

use crate::error::{CompileError, Result};

use super::{
    token::{KEYWORDS, ONE_SYMBOL_TOKENS, TWO_SYMBOLS_TOKENS},
    Token, TokenKind,
};

/// Splits source text into tokens on demand.
///
/// The lexer only ever moves forward. Once it has produced the `Eof` token
/// (or an error) the iterator is exhausted.
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
    done: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
            done: false,
        }
    }

    pub fn tokenize(source: &str) -> Result<Vec<Token>> {
        Lexer::new(source).collect()
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.index += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn new_token(&self, kind: TokenKind, lexeme: String, line: usize, column: usize) -> Token {
        trace!(?kind, %lexeme, line, column, "token");
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.current() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '/' && self.peek() == Some('/') {
                while self.current().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else if c == '/' && self.peek() == Some('*') {
                self.advance();
                self.advance();
                while self.current().is_some() {
                    if self.current() == Some('*') && self.peek() == Some('/') {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn parse_identifier(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut s = String::new();
        while let Some(c) = self.current() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            s.push(c);
            self.advance();
        }

        let kind = KEYWORDS.get(s.as_str()).copied().unwrap_or(TokenKind::Ident);
        self.new_token(kind, s, line, column)
    }

    fn parse_number(&mut self) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        let mut s = String::new();
        let mut is_real = false;
        while let Some(c) = self.current() {
            if c == '.' {
                if is_real {
                    s.push(c);
                    return Err(CompileError::lexical(
                        format!("malformed number literal '{}'", s),
                        self.line,
                        self.column,
                    ));
                }
                is_real = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            s.push(c);
            self.advance();
        }

        let kind = if is_real {
            TokenKind::RealLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        Ok(self.new_token(kind, s, line, column))
    }

    /// The lexeme of a text literal is its content without the quotes.
    fn parse_text(&mut self) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        self.advance();
        let mut s = String::new();
        loop {
            match self.current() {
                Some('"') => {
                    self.advance();
                    return Ok(self.new_token(TokenKind::TextLiteral, s, line, column));
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => {
                    return Err(CompileError::lexical(
                        "unterminated text literal",
                        line,
                        column,
                    ))
                }
            }
        }
    }

    fn parse_symbol(&mut self, c: char) -> Result<Token> {
        let (line, column) = (self.line, self.column);
        let c2: String = self.chars[self.index..].iter().take(2).collect();

        if let Some(kind) = TWO_SYMBOLS_TOKENS.get(c2.as_str()) {
            self.advance();
            self.advance();
            Ok(self.new_token(*kind, c2, line, column))
        } else if let Some(kind) = ONE_SYMBOL_TOKENS.get(&c) {
            self.advance();
            Ok(self.new_token(*kind, c.to_string(), line, column))
        } else if c == '!' {
            Err(CompileError::lexical("'!' must be followed by '='", line, column))
        } else {
            Err(CompileError::lexical(
                format!("unexpected character '{}'", c),
                line,
                column,
            ))
        }
    }

    /// Returns the next token, or an `Eof` token once the input is used up.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let Some(c) = self.current() else {
            return Ok(self.new_token(TokenKind::Eof, String::new(), self.line, self.column));
        };

        if c.is_alphabetic() || c == '_' {
            Ok(self.parse_identifier())
        } else if c.is_ascii_digit() {
            self.parse_number()
        } else if c == '"' {
            self.parse_text()
        } else {
            self.parse_symbol(c)
        }
    }
}

impl Iterator for Lexer {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        if !matches!(&token, Ok(t) if t.kind != TokenKind::Eof) {
            self.done = true;
        }
        Some(token)
    }
}
