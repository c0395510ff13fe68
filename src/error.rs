use std::fmt;

use thiserror::Error;

use crate::lexer::Position;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lexical"),
            ErrorKind::Syntax => write!(f, "syntax"),
            ErrorKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// The first fatal error of a compilation. Positions are 1-based; `0:0`
/// means the error has no source location.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CompileError {
    #[error("lexical error: {message}{}", suffix(*line, *column))]
    Lexical {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("syntax error: {message}{}", suffix(*line, *column))]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("semantic error: {message}{}", suffix(*line, *column))]
    Semantic {
        message: String,
        line: usize,
        column: usize,
    },
}

fn suffix(line: usize, column: usize) -> String {
    if line == 0 {
        String::new()
    } else {
        format!(" (line {line}, column {column})")
    }
}

impl CompileError {
    pub fn lexical(message: impl Into<String>, line: usize, column: usize) -> Self {
        CompileError::Lexical {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn syntax(message: impl Into<String>, pos: Position) -> Self {
        CompileError::Syntax {
            message: message.into(),
            line: pos.line,
            column: pos.column,
        }
    }

    pub fn semantic(message: impl Into<String>, pos: Option<Position>) -> Self {
        let pos = pos.unwrap_or_default();
        CompileError::Semantic {
            message: message.into(),
            line: pos.line,
            column: pos.column,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Lexical { .. } => ErrorKind::Lexical,
            CompileError::Syntax { .. } => ErrorKind::Syntax,
            CompileError::Semantic { .. } => ErrorKind::Semantic,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Lexical { message, .. }
            | CompileError::Syntax { message, .. }
            | CompileError::Semantic { message, .. } => message,
        }
    }

    pub fn position(&self) -> (usize, usize) {
        match self {
            CompileError::Lexical { line, column, .. }
            | CompileError::Syntax { line, column, .. }
            | CompileError::Semantic { line, column, .. } => (*line, *column),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
}

/// A non-fatal finding reported alongside a successful compilation.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>, pos: Option<Position>) -> Self {
        let pos = pos.unwrap_or_default();
        Self {
            severity: Severity::Warning,
            message: message.into(),
            line: pos.line,
            column: pos.column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Severity::Warning = self.severity;
        write!(f, "warning: {}{}", self.message, suffix(self.line, self.column))
    }
}
