use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vec3::Vec3;

/// A value produced by evaluating a handler expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A single floating-point number.
    Scalar(f64),
    /// A three-lane vector.
    Vector(Vec3),
}

/// The static type of an expression, known after binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A single floating-point number.
    Scalar,
    /// A three-lane vector.
    Vector,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

/// An arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    /// Source symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// Apply the operator to two scalars with IEEE semantics.
    pub fn apply_scalar(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
        }
    }

    /// Result type of `lhs op rhs`. Any vector operand makes the result a vector.
    pub fn result_type(lhs: ValueType, rhs: ValueType) -> ValueType {
        match (lhs, rhs) {
            (ValueType::Scalar, ValueType::Scalar) => ValueType::Scalar,
            _ => ValueType::Vector,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A vector lane selected with `.x`, `.y`, or `.z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// First lane.
    X,
    /// Second lane.
    Y,
    /// Third lane.
    Z,
}

impl Axis {
    /// Parse a field name into an axis.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            _ => None,
        }
    }

    /// Read this lane from a vector.
    pub fn get(self, v: Vec3) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }

    /// Mutable access to this lane of a vector.
    pub fn get_mut(self, v: &mut Vec3) -> &mut f64 {
        match self {
            Self::X => &mut v.x,
            Self::Y => &mut v.y,
            Self::Z => &mut v.z,
        }
    }
}

impl Value {
    /// The static type of this value.
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Scalar(_) => ValueType::Scalar,
            Self::Vector(_) => ValueType::Vector,
        }
    }

    /// View as a vector, broadcasting a scalar to all lanes.
    pub fn to_vec3(self) -> Vec3 {
        match self {
            Self::Scalar(s) => Vec3::splat(s),
            Self::Vector(v) => v,
        }
    }

    /// The scalar payload, if this is a scalar.
    pub fn as_scalar(self) -> Option<f64> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Vector(_) => None,
        }
    }

    /// Apply a binary operator. Scalars combine as scalars; otherwise lanes
    /// combine pairwise with scalars broadcast.
    pub fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
        match (lhs, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(op.apply_scalar(a, b)),
            (a, b) => Value::Vector(
                a.to_vec3()
                    .zip_with(b.to_vec3(), |x, y| op.apply_scalar(x, y)),
            ),
        }
    }

    /// Negate every lane.
    pub fn negate(self) -> Value {
        match self {
            Self::Scalar(s) => Self::Scalar(-s),
            Self::Vector(v) => Self::Vector(-v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Vector(v) => write!(f, "{v}"),
        }
    }
}
