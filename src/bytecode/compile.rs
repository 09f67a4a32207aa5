use crate::bytecode::lump::LumpError;
use crate::bytecode::{Lump, OpCode};
use crate::frontend::lexer::TokenBuffer;
use crate::frontend::parser::{Emitter, ParseError, Parser};
use crate::lang::operator::{BinaryOp, UnaryOp};

/// Emits bytecode into a [`Lump`] while parsing.
///
/// Operands are emitted before their operator, so the instruction stream is
/// the postfix form of the expression. Each newline the parser steps over
/// becomes an `OP_LINE_INC`.
#[derive(Debug, Default)]
pub struct Compiler {
    lump: Lump,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for Compiler {
    type Item = ();
    type Output = Lump;
    type Error = LumpError;

    fn number(&mut self, value: f64) -> Result<(), LumpError> {
        self.lump.add_constant(value)?;
        Ok(())
    }

    fn unary(&mut self, op: UnaryOp, _operand: ()) -> Result<(), LumpError> {
        self.lump.add_code(op.opcode());
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp, _lhs: (), _rhs: ()) -> Result<(), LumpError> {
        self.lump.add_code(op.opcode());
        Ok(())
    }

    fn newline(&mut self) {
        self.lump.add_code(OpCode::LineInc);
    }

    fn placeholder(&self) {}

    fn finish(mut self, _item: ()) -> Result<Lump, LumpError> {
        self.lump.add_code(OpCode::Return);
        log::debug!(
            "compiled {} bytes, {} constants",
            self.lump.len(),
            self.lump.constants().len()
        );
        Ok(self.lump)
    }
}

/// Parses the single expression in `tokens` and compiles it to a lump
/// terminated by `OP_RETURN`.
pub fn compile(source: &str, tokens: &TokenBuffer) -> Result<Lump, ParseError> {
    Parser::new(source, tokens, Compiler::new()).parse()
}
