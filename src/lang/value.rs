use serde::{Deserialize, Serialize};

/// Scalar value produced by evaluation and held on the VM operand stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    Number(f64),
    Bool(bool),
    #[default]
    Nil,
}

/// An operator applied to operands it does not accept.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("operand of '{op}' must be a number, got {operand}")]
    UnaryType { op: &'static str, operand: &'static str },

    #[error("operands of '{op}' must be {expected}, got {left} and {right}")]
    BinaryType {
        op: &'static str,
        expected: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("modulo by zero")]
    ModuloByZero,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Nil => "nil",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn negate(self) -> Result<Value, ValueError> {
        match self {
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(ValueError::UnaryType {
                op: "-",
                operand: other.type_name(),
            }),
        }
    }

    /// `!b` for booleans; a number is false exactly when it is zero.
    pub fn logical_not(self) -> Result<Value, ValueError> {
        match self {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            Value::Number(n) => Ok(Value::Bool(n == 0.0)),
            Value::Nil => Err(ValueError::UnaryType {
                op: "!",
                operand: "nil",
            }),
        }
    }

    pub fn add(self, rhs: Value) -> Result<Value, ValueError> {
        numeric("+", self, rhs).map(|(a, b)| Value::Number(a + b))
    }

    pub fn subtract(self, rhs: Value) -> Result<Value, ValueError> {
        numeric("-", self, rhs).map(|(a, b)| Value::Number(a - b))
    }

    pub fn multiply(self, rhs: Value) -> Result<Value, ValueError> {
        numeric("*", self, rhs).map(|(a, b)| Value::Number(a * b))
    }

    /// IEEE division: dividing by zero gives an infinity or NaN.
    pub fn divide(self, rhs: Value) -> Result<Value, ValueError> {
        numeric("/", self, rhs).map(|(a, b)| Value::Number(a / b))
    }

    /// Integer remainder. Both operands are truncated toward zero first.
    pub fn modulo(self, rhs: Value) -> Result<Value, ValueError> {
        let (a, b) = numeric("%", self, rhs)?;
        let (a, b) = (a.trunc() as i64, b.trunc() as i64);
        if b == 0 {
            return Err(ValueError::ModuloByZero);
        }
        Ok(Value::Number(a.wrapping_rem(b) as f64))
    }

    pub fn greater(self, rhs: Value) -> Result<Value, ValueError> {
        numeric(">", self, rhs).map(|(a, b)| Value::Bool(a > b))
    }

    pub fn greater_equal(self, rhs: Value) -> Result<Value, ValueError> {
        numeric(">=", self, rhs).map(|(a, b)| Value::Bool(a >= b))
    }

    pub fn less(self, rhs: Value) -> Result<Value, ValueError> {
        numeric("<", self, rhs).map(|(a, b)| Value::Bool(a < b))
    }

    pub fn less_equal(self, rhs: Value) -> Result<Value, ValueError> {
        numeric("<=", self, rhs).map(|(a, b)| Value::Bool(a <= b))
    }

    pub fn equal(self, rhs: Value) -> Result<Value, ValueError> {
        same_type_eq("==", self, rhs).map(Value::Bool)
    }

    pub fn not_equal(self, rhs: Value) -> Result<Value, ValueError> {
        same_type_eq("!=", self, rhs).map(|eq| Value::Bool(!eq))
    }
}

fn numeric(op: &'static str, lhs: Value, rhs: Value) -> Result<(f64, f64), ValueError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(ValueError::BinaryType {
            op,
            expected: "numbers",
            left: lhs.type_name(),
            right: rhs.type_name(),
        }),
    }
}

fn same_type_eq(op: &'static str, lhs: Value, rhs: Value) -> Result<bool, ValueError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Nil, Value::Nil) => Ok(true),
        _ => Err(ValueError::BinaryType {
            op,
            expected: "of the same type",
            left: lhs.type_name(),
            right: rhs.type_name(),
        }),
    }
}

impl std::fmt::Display for Value {
    /// Numbers print the shortest form that reads back the same (`20`, `2.5`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
        }
    }
}
