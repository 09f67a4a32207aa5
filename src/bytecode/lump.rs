use serde::{Deserialize, Serialize};

use crate::bytecode::OpCode;

/// Leading bytes of a serialized lump.
pub const LUMP_MAGIC: [u8; 4] = *b"QLMP";

#[derive(Debug, thiserror::Error)]
pub enum LumpError {
    #[error("constant pool full: index {0} does not fit in two bytes")]
    TooManyConstants(usize),

    #[error("not a compiled lump (bad magic bytes)")]
    BadMagic,

    #[error("malformed lump: {0}")]
    Decode(#[from] postcard::Error),
}

/// Append-only pool of numeric literals. An index stays valid for the life
/// of the pool; equal literals are not merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantPool {
    values: Vec<f64>,
}

impl ConstantPool {
    /// The pool grows in blocks of this many constants.
    const GROW_BY: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` and returns its index.
    pub fn add(&mut self, value: f64) -> usize {
        if self.values.len() == self.values.capacity() {
            self.values.reserve_exact(Self::GROW_BY);
        }
        self.values.push(value);
        self.values.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// A bytecode unit: the instruction stream plus the constants it refers to.
///
/// Every opcode byte is followed by exactly `OpCode::arity` operand bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lump {
    code: Vec<u8>,
    constants: ConstantPool,
}

impl Lump {
    /// The code buffer grows in blocks of this many bytes.
    const GROW_BY: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a lump from raw parts without checking them. Use
    /// [`crate::bytecode::verify`] before trusting the result.
    pub fn from_parts(code: Vec<u8>, constants: Vec<f64>) -> Self {
        Lump {
            code,
            constants: ConstantPool { values: constants },
        }
    }

    /// Appends an operand-less opcode and returns its byte offset.
    pub fn add_code(&mut self, op: OpCode) -> usize {
        debug_assert_eq!(op.arity(), 0, "{} takes operands", op);
        let offset = self.code.len();
        self.write(&[op.to_byte()]);
        offset
    }

    /// Adds `value` to the constant pool and emits the instruction that loads
    /// it: `CONSTANT` for indices below 256, `CONSTANT_LONG` otherwise.
    ///
    /// Returns the pool index, not the instruction offset.
    pub fn add_constant(&mut self, value: f64) -> Result<usize, LumpError> {
        let index = self.constants.len();
        if index > u16::MAX as usize {
            return Err(LumpError::TooManyConstants(index));
        }
        self.constants.add(value);

        match u8::try_from(index) {
            Ok(short) => self.write(&[OpCode::Constant.to_byte(), short]),
            Err(_) => {
                let [hi, lo] = (index as u16).to_be_bytes();
                self.write(&[OpCode::ConstantLong.to_byte(), hi, lo]);
            }
        }
        Ok(index)
    }

    fn write(&mut self, bytes: &[u8]) {
        let free = self.code.capacity() - self.code.len();
        if free < bytes.len() {
            self.code.reserve_exact(Self::GROW_BY.max(bytes.len()));
        }
        self.code.extend_from_slice(bytes);
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Serializes as magic bytes followed by the postcard encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LumpError> {
        let mut out = LUMP_MAGIC.to_vec();
        out.extend(postcard::to_allocvec(self)?);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Lump, LumpError> {
        let body = bytes
            .strip_prefix(LUMP_MAGIC.as_slice())
            .ok_or(LumpError::BadMagic)?;
        Ok(postcard::from_bytes(body)?)
    }
}
