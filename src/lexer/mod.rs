mod lexer;
mod token;

pub use lexer::*;
pub use token::{Position, Token, TokenKind};
