use crate::analyzer::Ty;
use crate::lexer::Position;

use super::{Expr, Identifier};

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub stmts: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub ty: Ty,
    pub name: String,
    pub pos: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    pub target: Identifier,
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForLoop {
    pub var: Identifier,
    pub from: Expr,
    pub to: Expr,
    /// Literal `1` when the source omits `step`.
    pub step: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Assign(Assign),
    If(Expr, Vec<Stmt>, Vec<Stmt>),
    While(Expr, Vec<Stmt>),
    For(ForLoop),
    Read(Vec<Identifier>),
    Write(Vec<Expr>),
}
