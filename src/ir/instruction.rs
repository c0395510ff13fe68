use std::fmt;

use crate::parser::{BinOpKind, UnaryOpKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Temporaries live in their own namespace, so a user variable called `t1`
/// never aliases the compiler's first temporary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Temp(u32),
    Var(String),
    Const(String),
}

impl Operand {
    pub fn is_temp(&self) -> bool {
        matches!(self, Operand::Temp(_))
    }

    pub fn as_const(&self) -> Option<&str> {
        match self {
            Operand::Const(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        self.as_const().is_some()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(n) => write!(f, "t{}", n),
            Operand::Var(name) => f.write_str(name),
            Operand::Const(c) => f.write_str(c),
        }
    }
}

/// A three-address instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    Assign {
        dest: Operand,
        src: Operand,
    },
    Op {
        dest: Operand,
        lhs: Operand,
        op: BinOpKind,
        rhs: Operand,
    },
    Unary {
        dest: Operand,
        op: UnaryOpKind,
        operand: Operand,
    },
    Goto(Label),
    If {
        label: Label,
        cond: Operand,
    },
    IfFalse {
        label: Label,
        cond: Operand,
    },
    Label(Label),
    Read(Operand),
    Write(Operand),
    Init {
        dest: Operand,
        value: String,
    },
}

impl Instr {
    /// The name this instruction writes, if any.
    pub fn dest(&self) -> Option<&Operand> {
        match self {
            Instr::Assign { dest, .. }
            | Instr::Op { dest, .. }
            | Instr::Unary { dest, .. }
            | Instr::Init { dest, .. }
            | Instr::Read(dest) => Some(dest),
            _ => None,
        }
    }

    /// Operands read by this instruction.
    pub fn uses(&self) -> Vec<&Operand> {
        match self {
            Instr::Assign { src, .. } => vec![src],
            Instr::Op { lhs, rhs, .. } => vec![lhs, rhs],
            Instr::Unary { operand, .. } => vec![operand],
            Instr::If { cond, .. } | Instr::IfFalse { cond, .. } => vec![cond],
            Instr::Write(src) => vec![src],
            Instr::Goto(_) | Instr::Label(_) | Instr::Read(_) | Instr::Init { .. } => vec![],
        }
    }

    /// Rewrites every operand this instruction reads. Returns whether any
    /// operand was replaced.
    pub fn rewrite_uses(&mut self, mut f: impl FnMut(&Operand) -> Option<Operand>) -> bool {
        let mut changed = false;
        let mut apply = |operand: &mut Operand| {
            if let Some(new) = f(operand) {
                if new != *operand {
                    *operand = new;
                    changed = true;
                }
            }
        };
        match self {
            Instr::Assign { src, .. } => apply(src),
            Instr::Op { lhs, rhs, .. } => {
                apply(lhs);
                apply(rhs);
            }
            Instr::Unary { operand, .. } => apply(operand),
            Instr::If { cond, .. } | Instr::IfFalse { cond, .. } => apply(cond),
            Instr::Write(src) => apply(src),
            Instr::Goto(_) | Instr::Label(_) | Instr::Read(_) | Instr::Init { .. } => (),
        }
        changed
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Assign { dest, src } => write!(f, "{} = {}", dest, src),
            Instr::Op { dest, lhs, op, rhs } => write!(f, "{} = {} {} {}", dest, lhs, op, rhs),
            Instr::Unary { dest, op, operand } => write!(f, "{} = {} {}", dest, op, operand),
            Instr::Goto(label) => write!(f, "goto {}", label),
            Instr::If { label, cond } => write!(f, "if {} goto {}", cond, label),
            Instr::IfFalse { label, cond } => write!(f, "ifFalse {} goto {}", cond, label),
            Instr::Label(label) => write!(f, "{}:", label),
            Instr::Read(dest) => write!(f, "read {}", dest),
            Instr::Write(src) => write!(f, "write {}", src),
            Instr::Init { dest, value } => write!(f, "{} = {}  // init", dest, value),
        }
    }
}
