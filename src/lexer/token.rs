use std::fmt;

use phf::phf_map;

pub(super) static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "integer" => TokenKind::Integer,
    "real" => TokenKind::Real,
    "text" => TokenKind::Text,
    "boolean" => TokenKind::Boolean,
    "begin" => TokenKind::Begin,
    "end" => TokenKind::End,
    "if" => TokenKind::If,
    "then" => TokenKind::Then,
    "else" => TokenKind::Else,
    "endif" => TokenKind::EndIf,
    "while" => TokenKind::While,
    "do" => TokenKind::Do,
    "endwhile" => TokenKind::EndWhile,
    "for" => TokenKind::For,
    "from" => TokenKind::From,
    "to" => TokenKind::To,
    "step" => TokenKind::Step,
    "endfor" => TokenKind::EndFor,
    "read" => TokenKind::Read,
    "write" => TokenKind::Write,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
};

pub(super) static TWO_SYMBOLS_TOKENS: phf::Map<&str, TokenKind> = phf_map! {
    "<=" => TokenKind::LessEqual,
    ">=" => TokenKind::GreaterEqual,
    "==" => TokenKind::DoubleEqual,
    "!=" => TokenKind::NotEqual,
    "<-" => TokenKind::Assign,
};

pub(super) static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
    '%' => TokenKind::Percent,
    '^' => TokenKind::Caret,
    '<' => TokenKind::LessThan,
    '>' => TokenKind::GreaterThan,
    '=' => TokenKind::Assign,
    '(' => TokenKind::OpenParen,
    ')' => TokenKind::CloseParen,
    ',' => TokenKind::Comma,
    ';' => TokenKind::SemiColon,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Integer,
    Real,
    Text,
    Boolean,

    Begin,
    End,
    If,
    Then,
    Else,
    EndIf,
    While,
    Do,
    EndWhile,
    For,
    From,
    To,
    Step,
    EndFor,
    Read,
    Write,

    And,
    Or,
    True,
    False,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,

    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    DoubleEqual,
    NotEqual,
    Assign,

    OpenParen,
    CloseParen,
    Comma,
    SemiColon,

    IntegerLiteral,
    RealLiteral,
    TextLiteral,
    Ident,

    Eof,
}

impl TokenKind {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer | TokenKind::Real | TokenKind::Text | TokenKind::Boolean
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::IntegerLiteral => return write!(f, "integer literal"),
            TokenKind::RealLiteral => return write!(f, "real literal"),
            TokenKind::TextLiteral => return write!(f, "text literal"),
            TokenKind::Ident => return write!(f, "identifier"),
            TokenKind::Eof => return write!(f, "end of input"),

            TokenKind::Integer => "integer",
            TokenKind::Real => "real",
            TokenKind::Text => "text",
            TokenKind::Boolean => "boolean",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::EndIf => "endif",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::EndWhile => "endwhile",
            TokenKind::For => "for",
            TokenKind::From => "from",
            TokenKind::To => "to",
            TokenKind::Step => "step",
            TokenKind::EndFor => "endfor",
            TokenKind::Read => "read",
            TokenKind::Write => "write",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::LessThan => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::DoubleEqual => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Assign => "<-",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Comma => ",",
            TokenKind::SemiColon => ";",
        };
        write!(f, "'{}'", s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}
