// =============================================================================
// OPCODE - one byte per instruction, followed by `arity()` operand bytes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Halt and yield the top of the stack.
    Return = 0,
    /// Advance the source-line counter. No stack effect.
    LineInc = 1,
    /// Push `pool[u8]`.
    Constant = 2,
    /// Push `pool[u16]`, index stored big-endian.
    ConstantLong = 3,

    // comparison
    NotEqual = 4,
    Equal = 5,
    Greater = 6,
    GreaterEqual = 7,
    Less = 8,
    LessEqual = 9,

    // arithmetic
    Add = 10,
    Subtract = 11,
    Multiply = 12,
    Modulo = 13,
    Divide = 14,

    // unary
    LogicalNot = 15,
    Negate = 16,
}

impl OpCode {
    pub const ALL: [OpCode; 17] = [
        OpCode::Return,
        OpCode::LineInc,
        OpCode::Constant,
        OpCode::ConstantLong,
        OpCode::NotEqual,
        OpCode::Equal,
        OpCode::Greater,
        OpCode::GreaterEqual,
        OpCode::Less,
        OpCode::LessEqual,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Modulo,
        OpCode::Divide,
        OpCode::LogicalNot,
        OpCode::Negate,
    ];

    /// Decodes an opcode byte, or `None` if no opcode has that value.
    pub fn from_byte(byte: u8) -> Option<OpCode> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes that follow the opcode.
    pub fn arity(self) -> usize {
        match self {
            OpCode::Constant => 1,
            OpCode::ConstantLong => 2,
            _ => 0,
        }
    }

    /// Returns (pops, pushes).
    pub fn stack_effect(self) -> (usize, usize) {
        use OpCode::*;
        match self {
            Return => (0, 0),
            LineInc => (0, 0),
            Constant | ConstantLong => (0, 1),
            NotEqual | Equal | Greater | GreaterEqual | Less | LessEqual => (2, 1),
            Add | Subtract | Multiply | Modulo | Divide => (2, 1),
            LogicalNot | Negate => (1, 1),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        use OpCode::*;
        match self {
            Return => "OP_RETURN",
            LineInc => "OP_LINE_INC",
            Constant => "OP_CONSTANT",
            ConstantLong => "OP_CONSTANT_LONG",
            NotEqual => "OP_NOT_EQUAL",
            Equal => "OP_EQUAL",
            Greater => "OP_GREATER",
            GreaterEqual => "OP_GREATER_EQUAL",
            Less => "OP_LESS",
            LessEqual => "OP_LESS_EQUAL",
            Add => "OP_ADD",
            Subtract => "OP_SUBTRACT",
            Multiply => "OP_MULTIPLY",
            Modulo => "OP_MODULO",
            Divide => "OP_DIVIDE",
            LogicalNot => "OP_LOGICAL_NOT",
            Negate => "OP_NEGATE",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
