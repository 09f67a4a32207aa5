use crate::bytecode::verify::VerifyError;
use crate::lang::value::ValueError;

/// Errors raised while a lump executes. Every variant carries the source line
/// the VM had reached, as tracked by `OP_LINE_INC`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("[line {line}] stack overflow (capacity {capacity})")]
    StackOverflow { line: usize, capacity: usize },

    #[error("[line {line}] stack underflow at offset {offset}")]
    StackUnderflow { line: usize, offset: usize },

    #[error("[line {line}] unknown opcode 0x{byte:02x} at offset {offset}")]
    UnknownOpcode { line: usize, offset: usize, byte: u8 },

    #[error("[line {line}] constant index {index} at offset {offset} is outside the pool")]
    BadConstant {
        line: usize,
        offset: usize,
        index: usize,
    },

    #[error("[line {line}] truncated instruction at offset {offset}")]
    Truncated { line: usize, offset: usize },

    #[error("[line {line}] {source}")]
    Type {
        line: usize,
        #[source]
        source: ValueError,
    },

    #[error("[line {line}] reached end of code without OP_RETURN")]
    UnexpectedEnd { line: usize },

    #[error("rejected by verifier: {0}")]
    Verify(#[from] VerifyError),
}

impl RuntimeError {
    /// Source line the error was raised on, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::StackOverflow { line, .. }
            | RuntimeError::StackUnderflow { line, .. }
            | RuntimeError::UnknownOpcode { line, .. }
            | RuntimeError::BadConstant { line, .. }
            | RuntimeError::Truncated { line, .. }
            | RuntimeError::Type { line, .. }
            | RuntimeError::UnexpectedEnd { line } => Some(*line),
            RuntimeError::Verify(_) => None,
        }
    }
}
