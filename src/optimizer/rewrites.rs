use std::collections::{HashMap, HashSet};

use crate::ir::{Instr, Operand};
use crate::parser::BinOpKind;

use super::fold::{fold_binary, fold_unary, Value};

/// Names read anywhere in `code`.
pub fn live_names(code: &[Instr]) -> HashSet<Operand> {
    code.iter()
        .flat_map(|instr| instr.uses())
        .filter(|o| !o.is_const())
        .cloned()
        .collect()
}

fn is_live(live: &HashSet<Operand>, name: &Operand) -> bool {
    !name.is_temp() || live.contains(name)
}

/// `t = 5 + 3` becomes `t = 8`.
pub fn constant_folding(code: Vec<Instr>) -> (Vec<Instr>, bool) {
    let mut changed = false;
    let code = code
        .into_iter()
        .map(|instr| {
            let folded = match &instr {
                Instr::Op { lhs, op, rhs, .. } => match (lhs.as_const(), rhs.as_const()) {
                    (Some(a), Some(b)) => fold_binary(*op, a, b),
                    _ => None,
                },
                Instr::Unary { op, operand, .. } => {
                    operand.as_const().and_then(|c| fold_unary(*op, c))
                }
                _ => None,
            };
            match (folded, instr) {
                (Some(value), Instr::Op { dest, .. } | Instr::Unary { dest, .. }) => {
                    changed = true;
                    Instr::Assign {
                        dest,
                        src: Operand::Const(value),
                    }
                }
                (_, instr) => instr,
            }
        })
        .collect();
    (code, changed)
}

/// Forward substitution of names known to hold a constant. Facts do not
/// survive a label, since control may arrive there from elsewhere.
pub fn constant_propagation(mut code: Vec<Instr>) -> (Vec<Instr>, bool) {
    let mut changed = false;
    let mut known: HashMap<Operand, String> = HashMap::new();

    for instr in code.iter_mut() {
        if let Instr::Label(_) = instr {
            known.clear();
            continue;
        }

        changed |= instr.rewrite_uses(|o| known.get(o).cloned().map(Operand::Const));

        if let Some(dest) = instr.dest() {
            let dest = dest.clone();
            match instr {
                Instr::Assign {
                    src: Operand::Const(c),
                    ..
                } => {
                    known.insert(dest, c.clone());
                }
                Instr::Init { value, .. } => {
                    known.insert(dest, value.clone());
                }
                _ => {
                    known.remove(&dest);
                }
            }
        }
    }
    (code, changed)
}

/// Neutral and absorbing elements of `+ - * /`. Only integer literals
/// count, so a real operand never turns the result into an integer.
pub fn algebraic_simplification(code: Vec<Instr>) -> (Vec<Instr>, bool) {
    let mut changed = false;
    let code = code
        .into_iter()
        .map(|instr| {
            let (dest, lhs, op, rhs) = match instr {
                Instr::Op { dest, lhs, op, rhs } => (dest, lhs, op, rhs),
                other => return other,
            };
            let value = |o: &Operand| o.as_const().and_then(Value::parse);
            let (l, r) = (value(&lhs), value(&rhs));
            let zero = |v: &Option<Value>| matches!(v, Some(Value::Int(0)));
            let one = |v: &Option<Value>| matches!(v, Some(Value::Int(1)));

            let src = match op {
                BinOpKind::Add if zero(&r) => Some(lhs.clone()),
                BinOpKind::Add if zero(&l) => Some(rhs.clone()),
                BinOpKind::Sub if zero(&r) => Some(lhs.clone()),
                BinOpKind::Mul if zero(&l) || zero(&r) => Some(Operand::Const("0".to_string())),
                BinOpKind::Mul if one(&r) => Some(lhs.clone()),
                BinOpKind::Mul if one(&l) => Some(rhs.clone()),
                BinOpKind::Div if one(&r) => Some(lhs.clone()),
                _ => None,
            };
            match src {
                Some(src) => {
                    changed = true;
                    Instr::Assign { dest, src }
                }
                None => Instr::Op { dest, lhs, op, rhs },
            }
        })
        .collect();
    (code, changed)
}

/// After `a = b`, reads of `a` become reads of `b` until either is written.
pub fn copy_propagation(mut code: Vec<Instr>) -> (Vec<Instr>, bool) {
    let mut changed = false;
    let mut copies: HashMap<Operand, Operand> = HashMap::new();

    for instr in code.iter_mut() {
        if let Instr::Label(_) = instr {
            copies.clear();
            continue;
        }

        changed |= instr.rewrite_uses(|o| copies.get(o).cloned());

        if let Some(dest) = instr.dest() {
            let dest = dest.clone();
            copies.retain(|k, v| *k != dest && *v != dest);
            if let Instr::Assign { src, .. } = instr {
                if !src.is_const() && *src != dest {
                    copies.insert(dest, src.clone());
                }
            }
        }
    }
    (code, changed)
}

/// Drops definitions of temporaries nobody reads, and everything between an
/// unconditional jump and the next label.
pub fn dead_code_elimination(code: Vec<Instr>, live: &HashSet<Operand>) -> (Vec<Instr>, bool) {
    let before = code.len();
    let mut reachable = true;
    let mut out = Vec::with_capacity(before);

    for instr in code {
        if let Instr::Label(_) = instr {
            reachable = true;
        }
        if !reachable {
            continue;
        }
        let dead = match &instr {
            Instr::Assign { dest, .. } | Instr::Op { dest, .. } | Instr::Unary { dest, .. } => {
                !is_live(live, dest)
            }
            _ => false,
        };
        if dead {
            continue;
        }
        if let Instr::Goto(_) = instr {
            reachable = false;
        }
        out.push(instr);
    }

    let changed = out.len() != before;
    (out, changed)
}
