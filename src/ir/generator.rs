use std::cmp::Ordering;

use tracing::debug;

use crate::parser::{BinOpKind, Expr, ForLoop, Program, Stmt};

use super::{Instr, Label, Operand};

/// Hands out temporaries and labels for one compilation. Names are never
/// reused.
#[derive(Debug, Default)]
pub struct NameGenerator {
    temp_index: u32,
    label_index: u32,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_temp(&mut self) -> Operand {
        self.temp_index += 1;
        Operand::Temp(self.temp_index)
    }

    pub fn new_label(&mut self) -> Label {
        self.label_index += 1;
        Label(self.label_index)
    }
}

/// Lowers a checked AST into three-address code.
pub struct IrGenerator {
    code: Vec<Instr>,
    names: NameGenerator,
}

impl Default for IrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IrGenerator {
    pub fn new() -> Self {
        Self {
            code: vec![],
            names: NameGenerator::new(),
        }
    }

    pub fn generate(mut self, program: &Program) -> Vec<Instr> {
        for d in program.declarations.iter() {
            self.emit(Instr::Init {
                dest: Operand::Var(d.name.clone()),
                value: d.ty.default_literal().to_string(),
            });
        }
        self.gen_stmts(&program.stmts);

        debug!(instructions = self.code.len(), "generated intermediate code");
        self.code
    }

    fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    fn gen_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                let src = self.gen_expr(&assign.expr);
                self.emit(Instr::Assign {
                    dest: Operand::Var(assign.target.name.clone()),
                    src,
                });
            }
            Stmt::If(cond, then_stmts, else_stmts) => self.gen_if(cond, then_stmts, else_stmts),
            Stmt::While(cond, body) => self.gen_while(cond, body),
            Stmt::For(for_loop) => self.gen_for(for_loop),
            Stmt::Read(targets) => {
                for target in targets {
                    self.emit(Instr::Read(Operand::Var(target.name.clone())));
                }
            }
            Stmt::Write(exprs) => {
                for expr in exprs {
                    let src = self.gen_expr(expr);
                    self.emit(Instr::Write(src));
                }
            }
        }
    }

    fn gen_if(&mut self, cond: &Expr, then_stmts: &[Stmt], else_stmts: &[Stmt]) {
        let cond = self.gen_expr(cond);
        let else_label = self.names.new_label();
        let end_label = self.names.new_label();

        let has_else = !else_stmts.is_empty();
        self.emit(Instr::IfFalse {
            label: if has_else { else_label } else { end_label },
            cond,
        });
        self.gen_stmts(then_stmts);
        if has_else {
            self.emit(Instr::Goto(end_label));
            self.emit(Instr::Label(else_label));
            self.gen_stmts(else_stmts);
        }
        self.emit(Instr::Label(end_label));
    }

    fn gen_while(&mut self, cond: &Expr, body: &[Stmt]) {
        let begin_label = self.names.new_label();
        let end_label = self.names.new_label();

        self.emit(Instr::Label(begin_label));
        let cond = self.gen_expr(cond);
        self.emit(Instr::IfFalse {
            label: end_label,
            cond,
        });
        self.gen_stmts(body);
        self.emit(Instr::Goto(begin_label));
        self.emit(Instr::Label(end_label));
    }

    fn gen_for(&mut self, for_loop: &ForLoop) {
        let begin_label = self.names.new_label();
        let end_label = self.names.new_label();
        let var = Operand::Var(for_loop.var.name.clone());

        let from = self.gen_expr(&for_loop.from);
        self.emit(Instr::Assign {
            dest: var.clone(),
            src: from,
        });
        let to = self.gen_expr(&for_loop.to);
        let bound = self.names.new_temp();
        self.emit(Instr::Assign {
            dest: bound.clone(),
            src: to,
        });

        self.emit(Instr::Label(begin_label));
        let cond = match for_loop.step.constant_sign() {
            Some(Ordering::Greater) => self.gen_op(var.clone(), BinOpKind::LessEqual, bound),
            Some(Ordering::Less) => self.gen_op(var.clone(), BinOpKind::GreaterEqual, bound),
            _ => {
                // (var - bound) * step <= 0 holds exactly while the loop has
                // not yet passed its bound, whatever the sign of step.
                let step = self.gen_expr(&for_loop.step);
                let distance = self.gen_op(var.clone(), BinOpKind::Sub, bound);
                let scaled = self.gen_op(distance, BinOpKind::Mul, step);
                self.gen_op(scaled, BinOpKind::LessEqual, Operand::Const("0".to_string()))
            }
        };
        self.emit(Instr::IfFalse {
            label: end_label,
            cond,
        });

        self.gen_stmts(&for_loop.body);

        let step = self.gen_expr(&for_loop.step);
        let next = self.gen_op(var.clone(), BinOpKind::Add, step);
        self.emit(Instr::Assign {
            dest: var,
            src: next,
        });
        self.emit(Instr::Goto(begin_label));
        self.emit(Instr::Label(end_label));
    }

    fn gen_op(&mut self, lhs: Operand, op: BinOpKind, rhs: Operand) -> Operand {
        let dest = self.names.new_temp();
        self.emit(Instr::Op {
            dest: dest.clone(),
            lhs,
            op,
            rhs,
        });
        dest
    }

    /// Returns the operand holding the value of `expr`.
    fn gen_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Literal(l) => Operand::Const(l.raw.clone()),
            Expr::Var(ident) => Operand::Var(ident.name.clone()),
            Expr::Binary(kind, left, right, _) => {
                let lhs = self.gen_expr(left);
                let rhs = self.gen_expr(right);
                self.gen_op(lhs, *kind, rhs)
            }
            Expr::Unary(op, operand, _) => {
                let operand = self.gen_expr(operand);
                let dest = self.names.new_temp();
                self.emit(Instr::Unary {
                    dest: dest.clone(),
                    op: *op,
                    operand,
                });
                dest
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn lower(source: &str) -> Vec<String> {
        let program = Parser::new(source).unwrap().parse().unwrap();
        IrGenerator::new()
            .generate(&program)
            .iter()
            .map(|i| i.to_string())
            .collect()
    }

    #[test]
    fn declarations_get_type_defaults() {
        assert_eq!(
            lower("integer i; real r; text s; boolean b; begin end"),
            vec![
                "i = 0  // init",
                "r = 0.0  // init",
                "s = \"\"  // init",
                "b = false  // init",
            ]
        );
    }

    #[test]
    fn assignment_goes_through_a_temporary() {
        assert_eq!(
            lower("integer x; begin x <- 5 + 3 end"),
            vec!["x = 0  // init", "t1 = 5 + 3", "x = t1"]
        );
    }

    #[test]
    fn nested_expression_order() {
        assert_eq!(
            lower("integer x, a, b, c; begin x <- a + b * -c end")[4..],
            ["t1 = - c", "t2 = b * t1", "t3 = a + t2", "x = t3"]
        );
    }

    #[test]
    fn if_without_else_jumps_to_end() {
        assert_eq!(
            lower("integer x; begin if x > 1 then write(x) endif end")[1..],
            ["t1 = x > 1", "ifFalse t1 goto L2", "write x", "L2:"]
        );
    }

    #[test]
    fn if_else_layout() {
        assert_eq!(
            lower("integer x; begin if true then x <- 1 else x <- 2 endif end")[1..],
            [
                "ifFalse true goto L1",
                "x = 1",
                "goto L2",
                "L1:",
                "x = 2",
                "L2:"
            ]
        );
    }

    #[test]
    fn while_layout() {
        assert_eq!(
            lower("integer x; begin while x < 3 do x <- x + 1 endwhile end")[1..],
            [
                "L1:",
                "t1 = x < 3",
                "ifFalse t1 goto L2",
                "t2 = x + 1",
                "x = t2",
                "goto L1",
                "L2:"
            ]
        );
    }

    #[test]
    fn for_with_descending_literal_step() {
        assert_eq!(
            lower("integer i; begin for i from 3 to 1 step -1 do write(i) endfor end")[1..],
            [
                "i = 3",
                "t1 = 1",
                "L1:",
                "t2 = i >= t1",
                "ifFalse t2 goto L2",
                "write i",
                "t3 = - 1",
                "t4 = i + t3",
                "i = t4",
                "goto L1",
                "L2:"
            ]
        );
    }

    #[test]
    fn for_with_runtime_step_uses_sign_neutral_test() {
        let code = lower("integer i, s; begin for i from 1 to 9 step s do endfor end");
        assert_eq!(
            code[2..],
            [
                "i = 1",
                "t1 = 9",
                "L1:",
                "t2 = i - t1",
                "t3 = t2 * s",
                "t4 = t3 <= 0",
                "ifFalse t4 goto L2",
                "t5 = i + s",
                "i = t5",
                "goto L1",
                "L2:"
            ]
        );
    }

    #[test]
    fn read_and_write_per_target() {
        assert_eq!(
            lower("integer a, b; begin read(a, b) write(a, \"x\") end")[2..],
            ["read a", "read b", "write a", "write \"x\""]
        );
    }
}
