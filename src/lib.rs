pub mod analyzer;
pub mod codegen;
pub mod config;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod session;

pub use config::{CompileOptions, MAX_OPTIMIZER_PASSES};
pub use error::{CompileError, Diagnostic, ErrorKind, Result};
pub use session::{compile, tokens, Compilation};
