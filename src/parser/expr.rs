use std::fmt;

use crate::lexer::Position;

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub pos: Position,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOpKind {
    Or,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Or => "or",
            BinOpKind::And => "and",
            BinOpKind::Equal => "==",
            BinOpKind::NotEqual => "!=",
            BinOpKind::LessThan => "<",
            BinOpKind::LessEqual => "<=",
            BinOpKind::GreaterThan => ">",
            BinOpKind::GreaterEqual => ">=",
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Pow => "^",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOpKind::Or | BinOpKind::And)
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, BinOpKind::Equal | BinOpKind::NotEqual) || self.is_ordering()
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            BinOpKind::LessThan
                | BinOpKind::LessEqual
                | BinOpKind::GreaterThan
                | BinOpKind::GreaterEqual
        )
    }
}

impl fmt::Display for BinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOpKind {
    Neg,
}

impl fmt::Display for UnaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOpKind::Neg => f.write_str("-"),
        }
    }
}

/// Lexical class of a literal, decided purely by its raw text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Real,
    Text,
    Boolean,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    /// Source text; text literals keep their double quotes.
    pub raw: String,
    pub pos: Option<Position>,
}

impl Literal {
    pub fn new(raw: impl Into<String>, pos: Option<Position>) -> Self {
        Self {
            raw: raw.into(),
            pos,
        }
    }

    pub fn kind(&self) -> LiteralKind {
        literal_kind(&self.raw)
    }
}

pub fn literal_kind(raw: &str) -> LiteralKind {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        LiteralKind::Text
    } else if raw == "true" || raw == "false" {
        LiteralKind::Boolean
    } else if raw.contains('.') {
        LiteralKind::Real
    } else {
        LiteralKind::Integer
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Binary(BinOpKind, Box<Expr>, Box<Expr>, Position),
    Unary(UnaryOpKind, Box<Expr>, Position),
    Literal(Literal),
    Var(Identifier),
}

impl Expr {
    pub fn position(&self) -> Option<Position> {
        match self {
            Expr::Binary(_, _, _, pos) | Expr::Unary(_, _, pos) => Some(*pos),
            Expr::Literal(l) => l.pos,
            Expr::Var(ident) => Some(ident.pos),
        }
    }

    /// Sign of a numeric constant written directly in the source, if any:
    /// a numeric literal or a negated one.
    pub fn constant_sign(&self) -> Option<std::cmp::Ordering> {
        match self {
            Expr::Literal(l) if matches!(l.kind(), LiteralKind::Integer | LiteralKind::Real) => {
                let value: f64 = l.raw.parse().ok()?;
                value.partial_cmp(&0.0)
            }
            Expr::Unary(UnaryOpKind::Neg, e, _) => e.constant_sign().map(|o| o.reverse()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::*;

    #[test]
    fn literal_kinds() {
        assert_eq!(literal_kind("12"), LiteralKind::Integer);
        assert_eq!(literal_kind("1.5"), LiteralKind::Real);
        assert_eq!(literal_kind("\"1.5\""), LiteralKind::Text);
        assert_eq!(literal_kind("\"\""), LiteralKind::Text);
        assert_eq!(literal_kind("false"), LiteralKind::Boolean);
    }

    #[test]
    fn constant_sign_sees_through_negation() {
        let one = Expr::Literal(Literal::new("1", None));
        let neg = Expr::Unary(UnaryOpKind::Neg, Box::new(one.clone()), Position::default());
        let zero = Expr::Literal(Literal::new("0.0", None));
        assert_eq!(one.constant_sign(), Some(Ordering::Greater));
        assert_eq!(neg.constant_sign(), Some(Ordering::Less));
        assert_eq!(zero.constant_sign(), Some(Ordering::Equal));
        assert_eq!(
            Expr::Var(Identifier {
                name: "s".into(),
                pos: Position::default()
            })
            .constant_sign(),
            None
        );
    }
}
