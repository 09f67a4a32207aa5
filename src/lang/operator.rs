use crate::bytecode::OpCode;
use crate::frontend::token::TokenKind;
use crate::lang::value::{Value, ValueError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<UnaryOp> {
        match kind {
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn from_opcode(op: OpCode) -> Option<UnaryOp> {
        match op {
            OpCode::Negate => Some(UnaryOp::Negate),
            OpCode::LogicalNot => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn opcode(self) -> OpCode {
        match self {
            UnaryOp::Negate => OpCode::Negate,
            UnaryOp::Not => OpCode::LogicalNot,
        }
    }

    pub fn apply(self, operand: Value) -> Result<Value, ValueError> {
        match self {
            UnaryOp::Negate => operand.negate(),
            UnaryOp::Not => operand.logical_not(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        Some(match kind {
            TokenKind::EqualEqual => BinaryOp::Equal,
            TokenKind::BangEqual => BinaryOp::NotEqual,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::LessEqual => BinaryOp::LessEqual,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::Percent => BinaryOp::Modulo,
            _ => return None,
        })
    }

    pub fn from_opcode(op: OpCode) -> Option<BinaryOp> {
        Some(match op {
            OpCode::Equal => BinaryOp::Equal,
            OpCode::NotEqual => BinaryOp::NotEqual,
            OpCode::Greater => BinaryOp::Greater,
            OpCode::GreaterEqual => BinaryOp::GreaterEqual,
            OpCode::Less => BinaryOp::Less,
            OpCode::LessEqual => BinaryOp::LessEqual,
            OpCode::Add => BinaryOp::Add,
            OpCode::Subtract => BinaryOp::Subtract,
            OpCode::Multiply => BinaryOp::Multiply,
            OpCode::Divide => BinaryOp::Divide,
            OpCode::Modulo => BinaryOp::Modulo,
            _ => return None,
        })
    }

    pub fn opcode(self) -> OpCode {
        match self {
            BinaryOp::Equal => OpCode::Equal,
            BinaryOp::NotEqual => OpCode::NotEqual,
            BinaryOp::Greater => OpCode::Greater,
            BinaryOp::GreaterEqual => OpCode::GreaterEqual,
            BinaryOp::Less => OpCode::Less,
            BinaryOp::LessEqual => OpCode::LessEqual,
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Subtract => OpCode::Subtract,
            BinaryOp::Multiply => OpCode::Multiply,
            BinaryOp::Divide => OpCode::Divide,
            BinaryOp::Modulo => OpCode::Modulo,
        }
    }

    pub fn apply(self, lhs: Value, rhs: Value) -> Result<Value, ValueError> {
        match self {
            BinaryOp::Equal => lhs.equal(rhs),
            BinaryOp::NotEqual => lhs.not_equal(rhs),
            BinaryOp::Greater => lhs.greater(rhs),
            BinaryOp::GreaterEqual => lhs.greater_equal(rhs),
            BinaryOp::Less => lhs.less(rhs),
            BinaryOp::LessEqual => lhs.less_equal(rhs),
            BinaryOp::Add => lhs.add(rhs),
            BinaryOp::Subtract => lhs.subtract(rhs),
            BinaryOp::Multiply => lhs.multiply(rhs),
            BinaryOp::Divide => lhs.divide(rhs),
            BinaryOp::Modulo => lhs.modulo(rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_opcode_mapping_is_consistent() {
        for op in OpCode::ALL {
            if let Some(binary) = BinaryOp::from_opcode(op) {
                assert_eq!(binary.opcode(), op);
            }
        }
    }

    #[test]
    fn test_unary_opcode_mapping_is_consistent() {
        assert_eq!(UnaryOp::from_opcode(OpCode::Negate), Some(UnaryOp::Negate));
        assert_eq!(UnaryOp::Not.opcode(), OpCode::LogicalNot);
        assert_eq!(UnaryOp::from_opcode(OpCode::Add), None);
    }

    #[test]
    fn test_token_mapping() {
        assert_eq!(BinaryOp::from_token(TokenKind::Percent), Some(BinaryOp::Modulo));
        assert_eq!(BinaryOp::from_token(TokenKind::Equal), None);
        assert_eq!(UnaryOp::from_token(TokenKind::Bang), Some(UnaryOp::Not));
    }

    #[test]
    fn test_apply_delegates_to_value() {
        assert_eq!(
            BinaryOp::Modulo.apply(Value::Number(9.0), Value::Number(4.0)),
            Ok(Value::Number(1.0))
        );
        assert_eq!(
            UnaryOp::Negate.apply(Value::Number(2.0)),
            Ok(Value::Number(-2.0))
        );
    }
}
