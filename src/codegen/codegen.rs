use std::cmp::Ordering;

use phf::phf_set;
use tracing::debug;

use crate::{
    analyzer::{SymbolTable, Ty},
    parser::{BinOpKind, Expr, ForLoop, Identifier, LiteralKind, Program, Stmt, UnaryOpKind},
};

const INDENT: &str = "    ";
const PROMPT: &str = "\"Enter a value: \"";

/// Python keywords and the builtins the generated code relies on. A source
/// variable with one of these names is renamed.
static RESERVED: phf::Set<&'static str> = phf_set! {
    "False", "None", "True", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "except", "finally", "global", "import",
    "in", "is", "lambda", "nonlocal", "not", "pass", "raise", "return", "try",
    "with", "yield", "print", "input", "int", "float", "main", "ValueError",
    "EOFError",
};

/// Target name of a source variable. Renamed names and loop bounds both
/// start with `_`, and verbatim names never do, so they cannot clash.
fn py_name(name: &str) -> String {
    if RESERVED.contains(name) || name.starts_with('_') {
        format!("_v{}", name)
    } else {
        name.to_string()
    }
}

fn py_text(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut s = String::with_capacity(raw.len());
    s.push('"');
    for c in inner.chars() {
        match c {
            '\\' => s.push_str("\\\\"),
            '\n' => s.push_str("\\n"),
            '\r' => s.push_str("\\r"),
            '\t' => s.push_str("\\t"),
            c if c.is_control() => s.push_str(&format!("\\x{:02x}", c as u32)),
            c => s.push(c),
        }
    }
    s.push('"');
    s
}

fn py_default(ty: Ty) -> &'static str {
    match ty {
        Ty::Integer => "0",
        Ty::Real => "0.0",
        Ty::Text => "\"\"",
        Ty::Boolean => "False",
    }
}

/// Renders a checked program as a Python 3 script.
pub struct Codegen<'a> {
    symbol_table: &'a SymbolTable,
    lines: Vec<String>,
    depth: usize,
    end_index: usize,
}

impl<'a> Codegen<'a> {
    pub fn new(symbol_table: &'a SymbolTable) -> Self {
        Self {
            symbol_table,
            lines: vec![],
            depth: 0,
            end_index: 0,
        }
    }

    pub fn generate(mut self, program: &Program) -> String {
        self.line("# Generated by minipas");
        self.line("");
        self.line("def main():");
        self.depth += 1;
        for d in program.declarations.iter() {
            self.line(format!("{} = {}", py_name(&d.name), py_default(d.ty)));
        }
        if program.declarations.is_empty() && program.stmts.is_empty() {
            self.line("pass");
        }
        self.gen_stmts(&program.stmts);
        self.depth -= 1;

        self.line("");
        self.line("");
        self.line("if __name__ == '__main__':");
        self.line(format!("{}main()", INDENT));

        debug!(lines = self.lines.len(), "generated target code");
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn line(&mut self, s: impl AsRef<str>) {
        let s = s.as_ref();
        if s.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.depth), s));
        }
    }

    fn new_end_name(&mut self) -> String {
        self.end_index += 1;
        format!("_end_{}", self.end_index)
    }

    /// An indented block; Python needs `pass` when it would be empty.
    fn gen_block(&mut self, stmts: &[Stmt]) {
        self.depth += 1;
        if stmts.is_empty() {
            self.line("pass");
        }
        self.gen_stmts(stmts);
        self.depth -= 1;
    }

    fn gen_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                let value = self.gen_expr(&assign.expr);
                self.line(format!("{} = {}", py_name(&assign.target.name), value));
            }
            Stmt::If(cond, then_stmts, else_stmts) => {
                let cond = self.gen_expr(cond);
                self.line(format!("if {}:", cond));
                self.gen_block(then_stmts);
                if !else_stmts.is_empty() {
                    self.line("else:");
                    self.gen_block(else_stmts);
                }
            }
            Stmt::While(cond, body) => {
                let cond = self.gen_expr(cond);
                self.line(format!("while {}:", cond));
                self.gen_block(body);
            }
            Stmt::For(for_loop) => self.gen_for(for_loop),
            Stmt::Read(targets) => {
                for target in targets {
                    self.gen_read(target);
                }
            }
            Stmt::Write(exprs) => {
                let args: Vec<_> = exprs.iter().map(|e| self.gen_expr(e)).collect();
                self.line(format!("print({})", args.join(", ")));
            }
        }
    }

    fn gen_read(&mut self, target: &Identifier) {
        let name = py_name(&target.name);
        let ty = self
            .symbol_table
            .get_var_type(&target.name)
            .unwrap_or(Ty::Text);

        let (value, errors, fallback) = match ty {
            Ty::Integer => (format!("int(input({}))", PROMPT), "(ValueError, EOFError)", "0"),
            Ty::Real => (format!("float(input({}))", PROMPT), "(ValueError, EOFError)", "0.0"),
            Ty::Boolean => (
                format!(
                    "input({}).strip().lower() in ('true', '1', 'yes', 'y')",
                    PROMPT
                ),
                "EOFError",
                "False",
            ),
            Ty::Text => (format!("input({})", PROMPT), "EOFError", "\"\""),
        };

        self.line("try:");
        self.depth += 1;
        self.line(format!("{} = {}", name, value));
        self.depth -= 1;
        self.line(format!("except {}:", errors));
        self.depth += 1;
        self.line(format!("{} = {}", name, fallback));
        self.depth -= 1;
    }

    /// The bound is evaluated once, before the first test. The step is
    /// re-evaluated on every increment.
    fn gen_for(&mut self, for_loop: &ForLoop) {
        let var = py_name(&for_loop.var.name);
        let end = self.new_end_name();
        let from = self.gen_expr(&for_loop.from);
        let to = self.gen_expr(&for_loop.to);
        let step = self.gen_expr(&for_loop.step);

        self.line(format!("{} = {}", var, from));
        self.line(format!("{} = {}", end, to));
        let cond = match for_loop.step.constant_sign() {
            Some(Ordering::Greater) => format!("{} <= {}", var, end),
            Some(Ordering::Less) => format!("{} >= {}", var, end),
            _ => format!("({} - {}) * {} <= 0", var, end, step),
        };
        self.line(format!("while {}:", cond));
        self.depth += 1;
        self.gen_stmts(&for_loop.body);
        self.line(format!("{} = {} + {}", var, var, step));
        self.depth -= 1;
    }

    fn gen_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(l) => match l.kind() {
                LiteralKind::Boolean if l.raw == "true" => "True".to_string(),
                LiteralKind::Boolean => "False".to_string(),
                LiteralKind::Text => py_text(&l.raw),
                LiteralKind::Integer | LiteralKind::Real => l.raw.clone(),
            },
            Expr::Var(ident) => py_name(&ident.name),
            // `^` is typed real, and `int ** int` stays an int in Python.
            Expr::Binary(BinOpKind::Pow, left, right, _) => format!(
                "(float({}) ** {})",
                self.gen_expr(left),
                self.gen_expr(right)
            ),
            Expr::Binary(kind, left, right, _) => format!(
                "({} {} {})",
                self.gen_expr(left),
                kind.symbol(),
                self.gen_expr(right)
            ),
            Expr::Unary(UnaryOpKind::Neg, operand, _) => format!("(-{})", self.gen_expr(operand)),
        }
    }
}
