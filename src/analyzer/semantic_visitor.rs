use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::error::{CompileError, Diagnostic, Result};
use crate::parser::{
    Assign, BinOpKind, Expr, ForLoop, Identifier, LiteralKind, Program, Stmt, UnaryOpKind,
};

use super::{SymbolTable, Ty};

/// Outcome of a successful semantic pass.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Walks the AST once, resolving names and inferring expression types.
/// Stops at the first fatal error; uninitialized reads are only recorded.
pub struct SemanticVisitor {
    symbol_table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl Default for SemanticVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticVisitor {
    pub fn new() -> Self {
        Self {
            symbol_table: SymbolTable::new(),
            diagnostics: vec![],
        }
    }

    pub fn visit_program(mut self, program: &Program) -> Result<Analysis> {
        for d in program.declarations.iter() {
            self.symbol_table.declare(&d.name, d.ty, d.pos)?;
        }

        self.visit_stmts(&program.stmts)?;

        debug!(
            symbols = program.declarations.len(),
            warnings = self.diagnostics.len(),
            "semantic analysis finished"
        );
        Ok(Analysis {
            symbols: self.symbol_table,
            diagnostics: self.diagnostics,
        })
    }

    fn visit_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    /// Statements of a branch or loop body run in their own scope.
    fn visit_scoped(&mut self, stmts: &[Stmt]) -> Result<()> {
        self.symbol_table.push_scope();
        let result = self.visit_stmts(stmts);
        self.symbol_table.pop_scope();
        result
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign(assign) => self.visit_assign(assign),
            Stmt::If(cond, then_stmts, else_stmts) => {
                self.visit_expr(cond)?;
                self.visit_scoped(then_stmts)?;
                self.visit_scoped(else_stmts)
            }
            Stmt::While(cond, body) => {
                self.visit_expr(cond)?;
                self.visit_scoped(body)
            }
            Stmt::For(for_loop) => self.visit_for(for_loop),
            Stmt::Read(targets) => {
                for target in targets {
                    self.resolve(target)?;
                    self.symbol_table.mark_initialized(&target.name);
                }
                Ok(())
            }
            Stmt::Write(exprs) => {
                for expr in exprs {
                    self.visit_expr(expr)?;
                }
                Ok(())
            }
        }
    }

    fn resolve(&self, ident: &Identifier) -> Result<Ty> {
        self.symbol_table.get_var_type(&ident.name).ok_or_else(|| {
            CompileError::semantic(
                format!("undeclared variable '{}'", ident.name),
                Some(ident.pos),
            )
        })
    }

    fn visit_assign(&mut self, assign: &Assign) -> Result<()> {
        let target_ty = self.resolve(&assign.target)?;
        let expr_ty = self.visit_expr(&assign.expr)?;
        if !target_ty.is_compatible(&expr_ty) {
            return Err(CompileError::semantic(
                format!(
                    "cannot assign {} to variable '{}' of type {}",
                    expr_ty, assign.target.name, target_ty
                ),
                Some(assign.target.pos),
            ));
        }
        self.symbol_table.mark_initialized(&assign.target.name);
        Ok(())
    }

    fn visit_for(&mut self, for_loop: &ForLoop) -> Result<()> {
        let var = &for_loop.var;
        let var_ty = self.resolve(var)?;
        if !var_ty.is_numeric() {
            return Err(CompileError::semantic(
                format!(
                    "for-loop variable '{}' must be numeric, found {}",
                    var.name, var_ty
                ),
                Some(var.pos),
            ));
        }

        let from_ty = self.visit_expr(&for_loop.from)?;
        if !var_ty.is_compatible(&from_ty) {
            return Err(CompileError::semantic(
                format!(
                    "cannot assign {} to variable '{}' of type {}",
                    from_ty, var.name, var_ty
                ),
                for_loop.from.position(),
            ));
        }
        for bound in [&for_loop.to, &for_loop.step] {
            let ty = self.visit_expr(bound)?;
            if !ty.is_numeric() {
                return Err(CompileError::semantic(
                    format!("for-loop bound must be numeric, found {}", ty),
                    bound.position(),
                ));
            }
        }
        if for_loop.step.constant_sign() == Some(Ordering::Equal) {
            return Err(CompileError::semantic(
                "for-loop step must not be zero",
                for_loop.step.position().or(Some(var.pos)),
            ));
        }

        self.symbol_table.mark_initialized(&var.name);
        self.visit_scoped(&for_loop.body)
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<Ty> {
        match expr {
            Expr::Literal(l) => Ok(match l.kind() {
                LiteralKind::Integer => Ty::Integer,
                LiteralKind::Real => Ty::Real,
                LiteralKind::Text => Ty::Text,
                LiteralKind::Boolean => Ty::Boolean,
            }),
            Expr::Var(ident) => {
                let ty = self.resolve(ident)?;
                let initialized = self
                    .symbol_table
                    .lookup(&ident.name)
                    .is_some_and(|s| s.initialized);
                if !initialized {
                    let diagnostic = Diagnostic::warning(
                        format!("variable '{}' is read before it is initialized", ident.name),
                        Some(ident.pos),
                    );
                    warn!("{}", diagnostic);
                    self.diagnostics.push(diagnostic);
                }
                Ok(ty)
            }
            Expr::Unary(UnaryOpKind::Neg, operand, pos) => {
                let ty = self.visit_expr(operand)?;
                if !ty.is_numeric() {
                    return Err(CompileError::semantic(
                        format!("unary '-' cannot be applied to {}", ty),
                        Some(*pos),
                    ));
                }
                Ok(ty)
            }
            Expr::Binary(kind, left, right, pos) => {
                let t1 = self.visit_expr(left)?;
                let t2 = self.visit_expr(right)?;
                let mismatch = || {
                    CompileError::semantic(
                        format!("operator '{}' cannot be applied to {} and {}", kind, t1, t2),
                        Some(*pos),
                    )
                };
                // text orders only against text; equality stays open
                if kind.is_ordering() && (t1 == Ty::Text) != (t2 == Ty::Text) {
                    return Err(mismatch());
                }
                if kind.is_logical() || kind.is_relational() {
                    return Ok(Ty::Boolean);
                }
                if !t1.is_numeric() || !t2.is_numeric() {
                    return Err(mismatch());
                }
                Ok(match kind {
                    BinOpKind::Div | BinOpKind::Pow => Ty::Real,
                    _ => t1.widen(&t2),
                })
            }
        }
    }
}
