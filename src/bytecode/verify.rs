use crate::bytecode::reader::{DecodeError, Reader};
use crate::bytecode::{Lump, OpCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("constant index {index} at offset {offset} is outside the pool ({len} constants)")]
    BadConstant {
        offset: usize,
        index: usize,
        len: usize,
    },

    #[error("stack underflow at offset {offset}: {op} needs {needed}, stack holds {height}")]
    Underflow {
        offset: usize,
        op: OpCode,
        needed: usize,
        height: usize,
    },

    #[error("stack overflow at offset {offset}: depth {height} exceeds capacity {capacity}")]
    Overflow {
        offset: usize,
        height: usize,
        capacity: usize,
    },

    #[error("code does not end with OP_RETURN")]
    MissingReturn,
}

/// Statically checks a lump before it is run: every opcode is known and
/// complete, constant indices resolve, and the modelled stack depth stays
/// within `0..=capacity`.
///
/// The instruction set has no jumps, so one linear pass sees every path.
/// Returns the maximum stack depth reached.
pub fn verify(lump: &Lump, capacity: usize) -> Result<usize, VerifyError> {
    let mut reader = Reader::new(lump.code());
    let mut height = 0usize;
    let mut max_height = 0usize;
    let mut last = None;

    while !reader.is_at_end() {
        let inst = reader.read_instruction()?;

        if let Some(index) = inst.operand {
            let index = index as usize;
            if index >= lump.constants().len() {
                return Err(VerifyError::BadConstant {
                    offset: inst.offset,
                    index,
                    len: lump.constants().len(),
                });
            }
        }

        let (pops, pushes) = inst.op.stack_effect();
        if height < pops {
            return Err(VerifyError::Underflow {
                offset: inst.offset,
                op: inst.op,
                needed: pops,
                height,
            });
        }
        height = height - pops + pushes;
        if height > capacity {
            return Err(VerifyError::Overflow {
                offset: inst.offset,
                height,
                capacity,
            });
        }
        max_height = max_height.max(height);
        last = Some(inst.op);
    }

    if last != Some(OpCode::Return) {
        return Err(VerifyError::MissingReturn);
    }

    Ok(max_height)
}
