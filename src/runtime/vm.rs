use crate::bytecode::disasm::disassemble_instruction;
use crate::bytecode::reader::{DecodeError, Reader};
use crate::bytecode::verify::verify;
use crate::bytecode::{Lump, OpCode};
use crate::lang::operator::{BinaryOp, UnaryOp};
use crate::lang::value::Value;
use crate::runtime::runtime_error::RuntimeError;
use crate::runtime::stack::Stack;

#[derive(Debug, Clone)]
pub struct VmConfig {
    pub stack_capacity: usize,
    /// Reject unknown opcode bytes instead of skipping them.
    pub strict_opcodes: bool,
    /// Print each instruction and the stack to stderr before executing it.
    pub trace: bool,
    /// Run the static verifier before executing.
    pub verify: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_capacity: 256,
            strict_opcodes: true,
            trace: false,
            verify: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    Ready,
    Running,
    HaltedOk,
    HaltedError,
}

pub struct Vm {
    stack: Stack,
    config: VmConfig,
    state: VmState,
    line: usize,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Vm {
            stack: Stack::with_capacity(config.stack_capacity),
            config,
            state: VmState::Ready,
            line: 1,
        }
    }

    pub fn state(&self) -> VmState {
        self.state
    }

    pub fn stack(&self) -> &[Value] {
        self.stack.as_slice()
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.line = 1;
        self.state = VmState::Ready;
    }

    /// Executes `lump` from its first byte and returns the value left by
    /// `OP_RETURN` (top of stack, or `nil` when the stack is empty).
    ///
    /// The VM is reset first, so one instance can run any number of lumps.
    pub fn interpret(&mut self, lump: &Lump) -> Result<Value, RuntimeError> {
        self.reset();

        if self.config.verify {
            if let Err(e) = verify(lump, self.config.stack_capacity) {
                self.state = VmState::HaltedError;
                return Err(e.into());
            }
        }

        self.state = VmState::Running;
        let result = self.run(lump);
        self.state = match result {
            Ok(_) => VmState::HaltedOk,
            Err(_) => VmState::HaltedError,
        };

        match &result {
            Ok(value) => log::debug!("halted with {}", value),
            Err(e) => log::debug!("halted on error: {}", e),
        }
        result
    }

    // Execution

    fn run(&mut self, lump: &Lump) -> Result<Value, RuntimeError> {
        let mut reader = Reader::new(lump.code());

        loop {
            let offset = reader.offset();
            if reader.is_at_end() {
                return Err(RuntimeError::UnexpectedEnd { line: self.line });
            }

            if self.config.trace {
                eprintln!(
                    "          [{}/{}] {:?}",
                    self.stack.len(),
                    self.stack.capacity(),
                    self.stack.as_slice()
                );
                eprintln!("{}", disassemble_instruction(lump, offset));
            } else if log::log_enabled!(log::Level::Trace) {
                log::trace!("{}", disassemble_instruction(lump, offset));
            }

            let inst = match reader.read_instruction() {
                Ok(inst) => inst,
                Err(DecodeError::UnknownOpcode { offset, byte }) => {
                    if self.config.strict_opcodes {
                        return Err(RuntimeError::UnknownOpcode {
                            line: self.line,
                            offset,
                            byte,
                        });
                    }
                    log::warn!("skipping unknown opcode 0x{:02x} at offset {}", byte, offset);
                    continue;
                }
                Err(DecodeError::Truncated { offset }) => {
                    return Err(RuntimeError::Truncated {
                        line: self.line,
                        offset,
                    });
                }
                Err(DecodeError::EndOfCode { .. }) => {
                    return Err(RuntimeError::UnexpectedEnd { line: self.line });
                }
            };

            match inst.op {
                OpCode::Return => return Ok(self.stack.pop().unwrap_or(Value::Nil)),
                OpCode::LineInc => self.line += 1,
                OpCode::Constant | OpCode::ConstantLong => {
                    let index = inst.operand.unwrap_or_default() as usize;
                    let value = lump.constants().get(index).ok_or(RuntimeError::BadConstant {
                        line: self.line,
                        offset,
                        index,
                    })?;
                    self.push(Value::Number(value))?;
                }

                // Unary
                OpCode::Negate => self.unary(UnaryOp::Negate, offset)?,
                OpCode::LogicalNot => self.unary(UnaryOp::Not, offset)?,

                // Comparison
                OpCode::Equal => self.binary(BinaryOp::Equal, offset)?,
                OpCode::NotEqual => self.binary(BinaryOp::NotEqual, offset)?,
                OpCode::Greater => self.binary(BinaryOp::Greater, offset)?,
                OpCode::GreaterEqual => self.binary(BinaryOp::GreaterEqual, offset)?,
                OpCode::Less => self.binary(BinaryOp::Less, offset)?,
                OpCode::LessEqual => self.binary(BinaryOp::LessEqual, offset)?,

                // Arithmetic
                OpCode::Add => self.binary(BinaryOp::Add, offset)?,
                OpCode::Subtract => self.binary(BinaryOp::Subtract, offset)?,
                OpCode::Multiply => self.binary(BinaryOp::Multiply, offset)?,
                OpCode::Divide => self.binary(BinaryOp::Divide, offset)?,
                OpCode::Modulo => self.binary(BinaryOp::Modulo, offset)?,
            }
        }
    }

    fn unary(&mut self, op: UnaryOp, offset: usize) -> Result<(), RuntimeError> {
        let operand = self.pop(offset)?;
        let result = op.apply(operand).map_err(|source| RuntimeError::Type {
            line: self.line,
            source,
        })?;
        self.push(result)
    }

    /// Pops the right operand first: operands were pushed left to right.
    fn binary(&mut self, op: BinaryOp, offset: usize) -> Result<(), RuntimeError> {
        let rhs = self.pop(offset)?;
        let lhs = self.pop(offset)?;
        let result = op.apply(lhs, rhs).map_err(|source| RuntimeError::Type {
            line: self.line,
            source,
        })?;
        self.push(result)
    }

    // Stack operations

    fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        self.stack
            .push(value)
            .map_err(|overflow| RuntimeError::StackOverflow {
                line: self.line,
                capacity: overflow.capacity,
            })
    }

    fn pop(&mut self, offset: usize) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            line: self.line,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::verify::VerifyError;
    use crate::lang::value::ValueError;

    // ============================================================
    // Test Helpers
    // ============================================================

    enum Emit {
        K(f64),
        Op(OpCode),
    }

    /// Build a lump from constants and operand-less ops
    fn lump_from(items: Vec<Emit>) -> Lump {
        let mut lump = Lump::new();
        for item in items {
            match item {
                Emit::K(n) => {
                    lump.add_constant(n).unwrap();
                }
                Emit::Op(op) => {
                    lump.add_code(op);
                }
            }
        }
        lump
    }

    fn run_ops(items: Vec<Emit>) -> Result<Value, RuntimeError> {
        Vm::new().interpret(&lump_from(items))
    }

    fn run_ops_with_config(items: Vec<Emit>, config: VmConfig) -> Result<Value, RuntimeError> {
        Vm::with_config(config).interpret(&lump_from(items))
    }

    fn assert_result(items: Vec<Emit>, expected: Value) {
        let value = run_ops(items).expect("execution should succeed");
        assert_eq!(value, expected, "result mismatch");
    }

    /// Assert execution produces an error containing the given substring
    fn assert_error(items: Vec<Emit>, error_contains: &str) {
        match run_ops(items) {
            Ok(value) => panic!(
                "expected error containing '{}', got value: {}",
                error_contains, value
            ),
            Err(e) => assert!(
                e.to_string().contains(error_contains),
                "expected error containing '{}', got: {}",
                error_contains,
                e
            ),
        }
    }

    use Emit::{K, Op};

    // ============================================================
    // Literals and return
    // ============================================================

    #[test]
    fn test_return_top_of_stack() {
        assert_result(vec![K(42.0), Op(OpCode::Return)], Value::Number(42.0));
    }

    #[test]
    fn test_return_on_empty_stack_is_nil() {
        assert_result(vec![Op(OpCode::Return)], Value::Nil);
    }

    #[test]
    fn test_constant_long() {
        // Depth stays at two: every constant after the first is folded in.
        let mut items = vec![K(0.0)];
        for i in 1..300 {
            items.push(K(i as f64));
            items.push(Op(OpCode::Add));
        }
        items.push(Op(OpCode::Return));
        assert_result(items, Value::Number((0..300).sum::<i32>() as f64));
    }

    #[test]
    fn test_constant_long_loads_last_index() {
        let config = VmConfig {
            stack_capacity: 300,
            ..VmConfig::default()
        };
        let mut items: Vec<Emit> = (0..300).map(|i| K(i as f64)).collect();
        items.push(Op(OpCode::Return));
        let lump = lump_from(items);
        assert_eq!(
            &lump.code()[lump.len() - 4..lump.len() - 1],
            &[OpCode::ConstantLong.to_byte(), 0x01, 0x2B]
        );
        assert_eq!(
            Vm::with_config(config).interpret(&lump),
            Ok(Value::Number(299.0))
        );
    }

    #[test]
    fn test_missing_return() {
        assert_error(vec![K(1.0)], "without OP_RETURN");
    }

    #[test]
    fn test_empty_lump() {
        let err = Vm::new().interpret(&Lump::new()).unwrap_err();
        assert_eq!(err, RuntimeError::UnexpectedEnd { line: 1 });
    }

    // ============================================================
    // Arithmetic
    // ============================================================

    #[test]
    fn test_add() {
        assert_result(
            vec![K(2.0), K(3.0), Op(OpCode::Add), Op(OpCode::Return)],
            Value::Number(5.0),
        );
    }

    #[test]
    fn test_subtract_operand_order() {
        assert_result(
            vec![K(10.0), K(4.0), Op(OpCode::Subtract), Op(OpCode::Return)],
            Value::Number(6.0),
        );
    }

    #[test]
    fn test_divide_operand_order() {
        assert_result(
            vec![K(1.0), K(4.0), Op(OpCode::Divide), Op(OpCode::Return)],
            Value::Number(0.25),
        );
    }

    #[test]
    fn test_modulo() {
        assert_result(
            vec![K(17.0), K(5.0), Op(OpCode::Modulo), Op(OpCode::Return)],
            Value::Number(2.0),
        );
    }

    #[test]
    fn test_modulo_by_zero() {
        assert_error(
            vec![K(1.0), K(0.0), Op(OpCode::Modulo), Op(OpCode::Return)],
            "modulo by zero",
        );
    }

    #[test]
    fn test_nested_expression() {
        // (2 + 3) * 4
        assert_result(
            vec![
                K(2.0),
                K(3.0),
                Op(OpCode::Add),
                K(4.0),
                Op(OpCode::Multiply),
                Op(OpCode::Return),
            ],
            Value::Number(20.0),
        );
    }

    #[test]
    fn test_negate() {
        assert_result(
            vec![K(3.0), Op(OpCode::Negate), Op(OpCode::Return)],
            Value::Number(-3.0),
        );
    }

    // ============================================================
    // Comparison and logic
    // ============================================================

    #[test]
    fn test_less() {
        assert_result(
            vec![K(1.0), K(2.0), Op(OpCode::Less), Op(OpCode::Return)],
            Value::Bool(true),
        );
    }

    #[test]
    fn test_greater_equal() {
        assert_result(
            vec![K(2.0), K(2.0), Op(OpCode::GreaterEqual), Op(OpCode::Return)],
            Value::Bool(true),
        );
    }

    #[test]
    fn test_logical_not_of_comparison() {
        assert_result(
            vec![
                K(1.0),
                K(2.0),
                Op(OpCode::Equal),
                Op(OpCode::LogicalNot),
                Op(OpCode::Return),
            ],
            Value::Bool(true),
        );
    }

    #[test]
    fn test_negate_bool_is_type_error() {
        let err = run_ops(vec![
            K(1.0),
            K(2.0),
            Op(OpCode::Less),
            Op(OpCode::Negate),
            Op(OpCode::Return),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Type {
                line: 1,
                source: ValueError::UnaryType { .. }
            }
        ));
    }

    // ============================================================
    // Stack discipline
    // ============================================================

    #[test]
    fn test_underflow() {
        let err = run_ops(vec![K(1.0), Op(OpCode::Add), Op(OpCode::Return)]).unwrap_err();
        assert_eq!(err, RuntimeError::StackUnderflow { line: 1, offset: 2 });
    }

    #[test]
    fn test_overflow() {
        let config = VmConfig {
            stack_capacity: 2,
            ..VmConfig::default()
        };
        let err = run_ops_with_config(
            vec![K(1.0), K(2.0), K(3.0), Op(OpCode::Return)],
            config,
        )
        .unwrap_err();
        assert_eq!(err, RuntimeError::StackOverflow { line: 1, capacity: 2 });
    }

    #[test]
    fn test_bad_constant_index() {
        let lump = Lump::from_parts(vec![OpCode::Constant.to_byte(), 3, 0], vec![1.0]);
        let err = Vm::new().interpret(&lump).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::BadConstant {
                line: 1,
                offset: 0,
                index: 3
            }
        );
    }

    #[test]
    fn test_truncated_long_constant() {
        let lump = Lump::from_parts(vec![OpCode::ConstantLong.to_byte(), 0], vec![1.0]);
        let err = Vm::new().interpret(&lump).unwrap_err();
        assert_eq!(err, RuntimeError::Truncated { line: 1, offset: 0 });
    }

    // ============================================================
    // Opcode handling
    // ============================================================

    #[test]
    fn test_unknown_opcode_strict() {
        let lump = Lump::from_parts(vec![0xEE, OpCode::Return.to_byte()], vec![]);
        let err = Vm::new().interpret(&lump).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnknownOpcode {
                line: 1,
                offset: 0,
                byte: 0xEE
            }
        );
    }

    #[test]
    fn test_unknown_opcode_lenient_skips() {
        let lump = Lump::from_parts(
            vec![OpCode::Constant.to_byte(), 0, 0xEE, OpCode::Return.to_byte()],
            vec![7.0],
        );
        let mut vm = Vm::with_config(VmConfig {
            strict_opcodes: false,
            ..VmConfig::default()
        });
        assert_eq!(vm.interpret(&lump), Ok(Value::Number(7.0)));
    }

    #[test]
    fn test_line_inc_tracks_error_line() {
        let err = run_ops(vec![
            K(1.0),
            Op(OpCode::LineInc),
            Op(OpCode::LineInc),
            K(0.0),
            Op(OpCode::Modulo),
            Op(OpCode::Return),
        ])
        .unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_verify_rejects_before_running() {
        let mut vm = Vm::with_config(VmConfig {
            verify: true,
            ..VmConfig::default()
        });
        let err = vm.interpret(&lump_from(vec![K(1.0)])).unwrap_err();
        assert_eq!(err, RuntimeError::Verify(VerifyError::MissingReturn));
        assert_eq!(vm.state(), VmState::HaltedError);
    }

    // ============================================================
    // State
    // ============================================================

    #[test]
    fn test_state_transitions() {
        let mut vm = Vm::new();
        assert_eq!(vm.state(), VmState::Ready);

        let ok = lump_from(vec![K(1.0), Op(OpCode::Return)]);
        vm.interpret(&ok).unwrap();
        assert_eq!(vm.state(), VmState::HaltedOk);

        let bad = lump_from(vec![Op(OpCode::Add), Op(OpCode::Return)]);
        assert!(vm.interpret(&bad).is_err());
        assert_eq!(vm.state(), VmState::HaltedError);

        vm.reset();
        assert_eq!(vm.state(), VmState::Ready);
        assert!(vm.stack().is_empty());
    }

    #[test]
    fn test_vm_is_reusable() {
        let mut vm = Vm::new();
        let first = lump_from(vec![K(1.0), K(2.0), Op(OpCode::Return)]);
        assert_eq!(vm.interpret(&first), Ok(Value::Number(2.0)));
        let second = lump_from(vec![Op(OpCode::Return)]);
        assert_eq!(vm.interpret(&second), Ok(Value::Nil));
    }
}
