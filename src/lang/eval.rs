use crate::frontend::lexer::TokenBuffer;
use crate::frontend::parser::{Emitter, ParseError, Parser};
use crate::lang::operator::{BinaryOp, UnaryOp};
use crate::lang::value::{Value, ValueError};

/// Folds an expression directly to its value while parsing.
///
/// Type errors surface as parser diagnostics at the offending operator.
#[derive(Debug, Default)]
pub struct Evaluator;

impl Emitter for Evaluator {
    type Item = Value;
    type Output = Value;
    type Error = ValueError;

    fn number(&mut self, value: f64) -> Result<Value, ValueError> {
        Ok(Value::Number(value))
    }

    fn unary(&mut self, op: UnaryOp, operand: Value) -> Result<Value, ValueError> {
        op.apply(operand)
    }

    fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ValueError> {
        op.apply(lhs, rhs)
    }

    fn newline(&mut self) {}

    fn placeholder(&self) -> Value {
        Value::Number(0.0)
    }

    fn finish(self, item: Value) -> Result<Value, ValueError> {
        Ok(item)
    }
}

/// Parses and evaluates the single expression in `tokens`.
pub fn evaluate(source: &str, tokens: &TokenBuffer) -> Result<Value, ParseError> {
    Parser::new(source, tokens, Evaluator).parse()
}
