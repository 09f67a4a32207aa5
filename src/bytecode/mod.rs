pub mod compile;
pub mod disasm;
pub mod lump;
pub mod op;
pub mod reader;
pub mod verify;

pub use lump::Lump;
pub use op::OpCode;
