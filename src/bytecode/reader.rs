use crate::bytecode::OpCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode 0x{byte:02x} at offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },

    #[error("instruction at offset {offset} is missing operand bytes")]
    Truncated { offset: usize },

    #[error("read past end of code at offset {offset}")]
    EndOfCode { offset: usize },
}

/// Bounds-checked cursor over an instruction stream.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Reader { code, pos: 0 }
    }

    pub fn at(code: &'a [u8], pos: usize) -> Self {
        Reader { code, pos }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.code.len()
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .code
            .get(self.pos)
            .ok_or(DecodeError::EndOfCode { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self
            .code
            .get(self.pos..self.pos + 2)
            .ok_or(DecodeError::EndOfCode { offset: self.pos })?;
        let value = u16::from_be_bytes([bytes[0], bytes[1]]);
        self.pos += 2;
        Ok(value)
    }

    /// Reads one opcode byte. An unknown byte is still consumed, so a caller
    /// may choose to skip it and continue.
    pub fn read_opcode(&mut self) -> Result<OpCode, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        OpCode::from_byte(byte).ok_or(DecodeError::UnknownOpcode { offset, byte })
    }

    /// Decodes the full instruction at the cursor, operands included.
    pub fn read_instruction(&mut self) -> Result<Instruction, DecodeError> {
        let offset = self.pos;
        let op = self.read_opcode()?;
        let operand = match op.arity() {
            0 => None,
            1 => Some(self.read_u8().map_err(|_| DecodeError::Truncated { offset })? as u16),
            _ => Some(self.read_u16().map_err(|_| DecodeError::Truncated { offset })?),
        };
        Ok(Instruction { offset, op, operand })
    }
}

/// A decoded instruction and where it started in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    pub op: OpCode,
    /// Constant-pool index for `CONSTANT` / `CONSTANT_LONG`.
    pub operand: Option<u16>,
}

impl Instruction {
    /// Size in bytes, opcode included.
    pub fn width(&self) -> usize {
        1 + self.op.arity()
    }
}

/// Iterates over every instruction in `code`, stopping after the first error.
pub fn instructions(code: &[u8]) -> Instructions<'_> {
    Instructions {
        reader: Reader::new(code),
        failed: false,
    }
}

#[derive(Debug)]
pub struct Instructions<'a> {
    reader: Reader<'a>,
    failed: bool,
}

impl Iterator for Instructions<'_> {
    type Item = Result<Instruction, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_at_end() {
            return None;
        }
        let result = self.reader.read_instruction();
        self.failed = result.is_err();
        Some(result)
    }
}
