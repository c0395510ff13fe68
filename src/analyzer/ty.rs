use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Integer,
    Real,
    Text,
    Boolean,
}

impl Ty {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Integer | Ty::Real)
    }

    /// Whether a value of type `other` may be stored in a variable of this
    /// type. Integer and real convert freely in both directions.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }

    /// Result type of an arithmetic operation on two numeric operands.
    pub fn widen(&self, other: &Self) -> Ty {
        if *self == Ty::Real || *other == Ty::Real {
            Ty::Real
        } else {
            Ty::Integer
        }
    }

    /// Literal text a freshly declared variable starts with.
    pub fn default_literal(&self) -> &'static str {
        match self {
            Ty::Integer => "0",
            Ty::Real => "0.0",
            Ty::Text => "\"\"",
            Ty::Boolean => "false",
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ty::Integer => "integer",
            Ty::Real => "real",
            Ty::Text => "text",
            Ty::Boolean => "boolean",
        };
        f.write_str(s)
    }
}
