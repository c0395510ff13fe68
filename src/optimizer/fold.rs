use std::cmp::Ordering;

use crate::parser::{literal_kind, BinOpKind, LiteralKind, UnaryOpKind};

/// Compile-time value of a constant operand.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
}

// Reals outside this window have no plain decimal spelling we can re-lex.
const MAX_EXACT_REAL: f64 = 1e15;
const MIN_PLAIN_REAL: f64 = 1e-4;

impl Value {
    pub fn parse(raw: &str) -> Option<Self> {
        match literal_kind(raw) {
            LiteralKind::Text => Some(Value::Text(raw[1..raw.len() - 1].to_string())),
            LiteralKind::Boolean => Some(Value::Bool(raw == "true")),
            LiteralKind::Integer => raw.parse().ok().map(Value::Int),
            LiteralKind::Real => raw.parse().ok().map(Value::Real),
        }
    }

    /// Literal spelling of the value, or `None` if it cannot be written back
    /// as a literal without losing information.
    pub fn to_literal(&self) -> Option<String> {
        match self {
            Value::Int(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Text(s) => Some(format!("\"{}\"", s)),
            Value::Real(r) => {
                if !r.is_finite() || r.abs() >= MAX_EXACT_REAL {
                    None
                } else if r.fract() == 0.0 {
                    Some((*r as i64).to_string())
                } else if r.abs() < MIN_PLAIN_REAL {
                    None
                } else {
                    Some(r.to_string())
                }
            }
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }
}

fn floored_mod_int(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

fn floored_mod_real(a: f64, b: f64) -> Option<f64> {
    if b == 0.0 {
        return None;
    }
    let r = a % b;
    Some(if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r })
}

fn compare(op: BinOpKind, ord: Ordering) -> bool {
    match op {
        BinOpKind::Equal => ord == Ordering::Equal,
        BinOpKind::NotEqual => ord != Ordering::Equal,
        BinOpKind::LessThan => ord == Ordering::Less,
        BinOpKind::LessEqual => ord != Ordering::Greater,
        BinOpKind::GreaterThan => ord == Ordering::Greater,
        BinOpKind::GreaterEqual => ord != Ordering::Less,
        _ => unreachable!("{} is not relational", op),
    }
}

/// Evaluates `a op b`. Returns `None` whenever the result would differ from
/// what the program does at run time, or would raise there.
pub fn eval_binary(op: BinOpKind, a: &Value, b: &Value) -> Option<Value> {
    if op.is_logical() {
        let (Value::Bool(a), Value::Bool(b)) = (a, b) else {
            return None;
        };
        return Some(Value::Bool(match op {
            BinOpKind::And => *a && *b,
            _ => *a || *b,
        }));
    }

    if op.is_relational() {
        let ord = match (a, b) {
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Text(x), Value::Text(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?)?,
        };
        return Some(Value::Bool(compare(op, ord)));
    }

    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        let (x, y) = (*x, *y);
        return match op {
            BinOpKind::Add => x.checked_add(y).map(Value::Int),
            BinOpKind::Sub => x.checked_sub(y).map(Value::Int),
            BinOpKind::Mul => x.checked_mul(y).map(Value::Int),
            BinOpKind::Mod => floored_mod_int(x, y).map(Value::Int),
            BinOpKind::Div if y == 0 => None,
            BinOpKind::Div => Some(Value::Real(x as f64 / y as f64)),
            BinOpKind::Pow => real_result((x as f64).powf(y as f64)),
            _ => None,
        };
    }

    let (x, y) = (a.as_f64()?, b.as_f64()?);
    match op {
        BinOpKind::Add => real_result(x + y),
        BinOpKind::Sub => real_result(x - y),
        BinOpKind::Mul => real_result(x * y),
        BinOpKind::Div if y == 0.0 => None,
        BinOpKind::Div => real_result(x / y),
        BinOpKind::Mod => floored_mod_real(x, y).and_then(real_result),
        BinOpKind::Pow => real_result(x.powf(y)),
        _ => None,
    }
}

fn real_result(r: f64) -> Option<Value> {
    r.is_finite().then_some(Value::Real(r))
}

pub fn eval_unary(op: UnaryOpKind, a: &Value) -> Option<Value> {
    match (op, a) {
        (UnaryOpKind::Neg, Value::Int(n)) => n.checked_neg().map(Value::Int),
        (UnaryOpKind::Neg, Value::Real(r)) => Some(Value::Real(-r)),
        _ => None,
    }
}

/// Folds a binary operation on two literal operands into a literal.
pub fn fold_binary(op: BinOpKind, lhs: &str, rhs: &str) -> Option<String> {
    let a = Value::parse(lhs)?;
    let b = Value::parse(rhs)?;
    eval_binary(op, &a, &b)?.to_literal()
}

pub fn fold_unary(op: UnaryOpKind, operand: &str) -> Option<String> {
    eval_unary(op, &Value::parse(operand)?)?.to_literal()
}
