use std::path::Path;

use crate::bytecode::Lump;
use crate::bytecode::compile::compile;
use crate::bytecode::lump::LumpError;
use crate::frontend::lexer::{LexError, Lexer};
use crate::frontend::parser::ParseError;
use crate::frontend::source::Source;
use crate::lang::eval::evaluate;
use crate::lang::value::Value;
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::vm::{Vm, VmConfig};

/// Any failure along the scan, parse, compile and run pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("{0}")]
    Lump(#[from] LumpError),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Scans and compiles `source` into a lump ending in `OP_RETURN`.
pub fn compile_source(source: &str) -> Result<Lump> {
    let tokens = Lexer::tokenize(source)?;
    log::debug!("scanned {} tokens", tokens.len());
    Ok(compile(source, &tokens)?)
}

/// Scans and evaluates `source` directly, without bytecode.
pub fn eval_source(source: &str) -> Result<Value> {
    let tokens = Lexer::tokenize(source)?;
    log::debug!("scanned {} tokens", tokens.len());
    Ok(evaluate(source, &tokens)?)
}

/// Compiles `source` and runs it on a fresh VM.
pub fn run_source(source: &str, config: VmConfig) -> Result<Value> {
    let lump = compile_source(source)?;
    Ok(Vm::with_config(config).interpret(&lump)?)
}

pub fn load_source(path: &Path) -> Result<Source> {
    Source::load(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Reads a lump previously written with [`Lump::to_bytes`].
pub fn load_lump(path: &Path) -> Result<Lump> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Lump::from_bytes(&bytes)?)
}

pub fn save_lump(path: &Path, lump: &Lump) -> Result<()> {
    let bytes = lump.to_bytes()?;
    std::fs::write(path, bytes).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}
