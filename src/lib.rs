//! # Quill
//!
//! A small expression language: a scanner, a recursive-descent parser that
//! either evaluates directly or compiles to bytecode, a disassembler and a
//! stack VM.
//!
//! ```text
//! source ──▶ Lexer ──▶ TokenBuffer ──▶ Parser<Evaluator> ──▶ Value
//!                                   └─▶ Parser<Compiler> ──▶ Lump ──▶ Vm ──▶ Value
//! ```

pub mod bytecode;
pub mod error;
pub mod frontend;
pub mod lang;
pub mod runtime;

pub use bytecode::{Lump, OpCode};
pub use error::{Error, Result, eval_source, run_source};
pub use lang::value::Value;
pub use runtime::vm::{Vm, VmConfig};
