use std::collections::HashMap;
use std::fmt::Write;

use crate::bytecode::reader::{DecodeError, Instruction, Reader, instructions};
use crate::bytecode::{Lump, OpCode};

/// Print disassembly of a lump under a header.
pub fn print_lump(name: &str, lump: &Lump) {
    println!("════════════════════════════════════════");
    println!(" {}", name);
    println!(
        " {} bytes, {} constants",
        lump.len(),
        lump.constants().len()
    );
    println!("════════════════════════════════════════");
    print!("{}", disassemble_to_string(lump));
}

/// Return the full listing as a String, one line per instruction:
///
/// ```text
/// 0000    0001    OP_CONSTANT      0000 2
/// 0002    |       OP_CONSTANT      0001 3
/// 0004    |       OP_LINE_INC
/// 0005    0002    OP_ADD
/// ```
///
/// The second column is the source line, or `|` when unchanged since the
/// previous instruction. Lines are counted from 1 and advanced by each
/// `OP_LINE_INC`, which is itself listed on the line it ends.
pub fn disassemble_to_string(lump: &Lump) -> String {
    let mut output = String::new();
    let mut reader = Reader::new(lump.code());
    let mut line = 1usize;
    let mut prev_line = None;

    while !reader.is_at_end() {
        let offset = reader.offset();
        let _ = write!(output, "{:04}\t", offset);

        if prev_line == Some(line) {
            output.push_str("|\t");
        } else {
            let _ = write!(output, "{:04}\t", line);
            prev_line = Some(line);
        }

        match reader.read_instruction() {
            Ok(inst) => {
                output.push_str(&format_instruction(lump, &inst));
                if inst.op == OpCode::LineInc {
                    line += 1;
                }
            }
            Err(DecodeError::UnknownOpcode { byte, .. }) => {
                let _ = write!(output, "{:<16} 0x{:02x}", "UNKNOWN", byte);
            }
            Err(_) => {
                output.push_str("TRUNCATED\n");
                break;
            }
        }
        output.push('\n');
    }

    output
}

/// Disassemble the single instruction starting at `offset`.
///
/// The line number is recovered by counting the `OP_LINE_INC` instructions
/// before `offset`, so this is linear in the offset. Only meant for tracing.
pub fn disassemble_instruction(lump: &Lump, offset: usize) -> String {
    let line = 1 + instructions(&lump.code()[..offset.min(lump.len())])
        .filter_map(Result::ok)
        .filter(|inst| inst.op == OpCode::LineInc)
        .count();

    let mut reader = Reader::at(lump.code(), offset);
    match reader.read_instruction() {
        Ok(inst) => format!("{:04}\t{:04}\t{}", offset, line, format_instruction(lump, &inst)),
        Err(e) => format!("{:04}\t{:04}\t<{}>", offset, line, e),
    }
}

fn format_instruction(lump: &Lump, inst: &Instruction) -> String {
    match inst.operand {
        Some(index) => {
            let value = lump
                .constants()
                .get(index as usize)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<missing>".to_string());
            format!("{:<16} {:04} {}", inst.op.mnemonic(), index, value)
        }
        None => inst.op.mnemonic().to_string(),
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Count how often each opcode appears.
pub fn op_counts(lump: &Lump) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for inst in instructions(lump.code()).filter_map(Result::ok) {
        *counts.entry(inst.op.mnemonic()).or_insert(0) += 1;
    }
    counts
}

/// Print lump statistics
pub fn print_lump_stats(lump: &Lump) {
    println!("=== LUMP STATISTICS ===\n");

    let counts = op_counts(lump);
    let total: usize = counts.values().sum();

    println!("Code bytes:   {}", lump.len());
    println!("Constants:    {}", lump.constants().len());
    println!("Instructions: {}", total);
    println!();

    println!("Op frequency:");
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    for (op, count) in counts.iter().take(10) {
        let pct = (*count as f64 / total as f64) * 100.0;
        println!("  {:<18} {:>4} ({:>5.1}%)", op, count, pct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_of_known_sequence() {
        let mut lump = Lump::new();
        lump.add_constant(2.0).unwrap();
        lump.add_constant(3.5).unwrap();
        lump.add_code(OpCode::Add);
        lump.add_code(OpCode::Return);

        let expected = "\
0000\t0001\tOP_CONSTANT      0000 2
0002\t|\tOP_CONSTANT      0001 3.5
0004\t|\tOP_ADD
0005\t|\tOP_RETURN
";
        assert_eq!(disassemble_to_string(&lump), expected);
    }

    #[test]
    fn test_line_inc_shows_new_line_once() {
        let mut lump = Lump::new();
        lump.add_constant(1.0).unwrap();
        lump.add_code(OpCode::LineInc);
        lump.add_constant(2.0).unwrap();
        lump.add_code(OpCode::Subtract);
        lump.add_code(OpCode::Return);

        let expected = "\
0000\t0001\tOP_CONSTANT      0000 1
0002\t|\tOP_LINE_INC
0003\t0002\tOP_CONSTANT      0001 2
0005\t|\tOP_SUBTRACT
0006\t|\tOP_RETURN
";
        assert_eq!(disassemble_to_string(&lump), expected);
    }

    #[test]
    fn test_long_constant_listing() {
        let mut lump = Lump::new();
        for i in 0..257 {
            lump.add_constant(i as f64).unwrap();
        }
        let listing = disassemble_to_string(&lump);
        let last = listing.lines().last().unwrap();
        assert_eq!(last, "0512\t|\tOP_CONSTANT_LONG 0256 256");
    }

    #[test]
    fn test_unknown_and_truncated_bytes() {
        let lump = Lump::from_parts(vec![0xEE, OpCode::ConstantLong.to_byte(), 0], vec![]);
        let listing = disassemble_to_string(&lump);
        assert!(listing.contains("UNKNOWN          0xee"));
        assert!(listing.ends_with("TRUNCATED\n"));
    }

    #[test]
    fn test_single_instruction_recovers_line() {
        let mut lump = Lump::new();
        lump.add_code(OpCode::LineInc);
        lump.add_code(OpCode::LineInc);
        lump.add_constant(9.0).unwrap();

        assert_eq!(
            disassemble_instruction(&lump, 2),
            "0002\t0003\tOP_CONSTANT      0000 9"
        );
        assert_eq!(disassemble_instruction(&lump, 0), "0000\t0001\tOP_LINE_INC");
    }

    #[test]
    fn test_op_counts() {
        let mut lump = Lump::new();
        lump.add_constant(1.0).unwrap();
        lump.add_constant(2.0).unwrap();
        lump.add_code(OpCode::Add);
        lump.add_constant(3.0).unwrap();
        lump.add_code(OpCode::Multiply);

        let counts = op_counts(&lump);
        assert_eq!(counts.get("OP_CONSTANT"), Some(&3));
        assert_eq!(counts.get("OP_ADD"), Some(&1));
        assert_eq!(counts.get("OP_MULTIPLY"), Some(&1));
    }
}
