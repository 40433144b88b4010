//! Human-readable bytecode listings for trace logging and tests.

use crate::bytecode::{Chunk, OpCode};
use crate::object::Obj;
use crate::value::Value;
use std::fmt::Write;

/// Renders every instruction in `chunk` under a `== name ==` header.
pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut out = format!("== {} ==\n", name);
    let mut offset = 0;
    while offset < chunk.len() {
        let (text, next) = disassemble_instruction(chunk, offset);
        out.push_str(&text);
        out.push('\n');
        offset = next;
    }
    out
}

/// Renders the instruction at `offset` and returns the offset of the next
/// instruction.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> (String, usize) {
    let mut text = format!("{:04} ", offset);
    if offset > 0 && chunk.line_at(offset) == chunk.line_at(offset - 1) {
        text.push_str("   | ");
    } else {
        let _ = write!(text, "{:4} ", chunk.line_at(offset));
    }

    let op = match OpCode::try_from(chunk.code[offset]) {
        Ok(op) => op,
        Err(byte) => {
            let _ = write!(text, "Unknown opcode {}", byte);
            return (text, offset + 1);
        }
    };
    let name = format!("{:?}", op);

    let next = match op {
        OpCode::OpConstant | OpCode::OpDefineGlobal | OpCode::OpGetGlobal | OpCode::OpSetGlobal => {
            let index = operand(chunk, offset + 1);
            let _ = write!(
                text,
                "{:<16} {:4} '{}'",
                name,
                index,
                constant_text(chunk, index as usize)
            );
            offset + 2
        }
        OpCode::OpGetLocal
        | OpCode::OpSetLocal
        | OpCode::OpGetUpvalue
        | OpCode::OpSetUpvalue
        | OpCode::OpCall => {
            let _ = write!(text, "{:<16} {:4}", name, operand(chunk, offset + 1));
            offset + 2
        }
        OpCode::OpJump | OpCode::OpJumpIfFalse | OpCode::OpLoop => {
            let jump = ((operand(chunk, offset + 1) as usize) << 8) | operand(chunk, offset + 2) as usize;
            let target = if op == OpCode::OpLoop {
                (offset + 3).saturating_sub(jump)
            } else {
                offset + 3 + jump
            };
            let _ = write!(text, "{:<16} {:4} -> {}", name, offset, target);
            offset + 3
        }
        OpCode::OpClosure => closure(chunk, offset, &name, &mut text),
        _ => {
            text.push_str(&name);
            offset + 1
        }
    };
    (text, next)
}

fn closure(chunk: &Chunk, offset: usize, name: &str, text: &mut String) -> usize {
    let index = operand(chunk, offset + 1) as usize;
    let _ = write!(text, "{:<16} {:4} {}", name, index, constant_text(chunk, index));
    let upvalue_count = match chunk.constants.get(index) {
        Some(Value::Obj(Obj::Function(function))) => function.upvalue_count,
        _ => 0,
    };
    let mut next = offset + 2;
    for _ in 0..upvalue_count {
        let kind = if operand(chunk, next) == 1 { "local" } else { "upvalue" };
        let _ = write!(text, "\n{:04}    |   {} {}", next, kind, operand(chunk, next + 1));
        next += 2;
    }
    next
}

fn operand(chunk: &Chunk, offset: usize) -> u8 {
    chunk.code.get(offset).copied().unwrap_or(0)
}

fn constant_text(chunk: &Chunk, index: usize) -> String {
    chunk
        .constants
        .get(index)
        .map_or_else(|| "<invalid>".to_string(), |value| value.to_string())
}

/// Logs the listing of `chunk` at trace level.
pub(crate) fn trace_chunk(chunk: &Chunk, name: &str) {
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("\n{}", disassemble_chunk(chunk, name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_shows_operands_and_lines() {
        let mut chunk = Chunk::new();
        let index = chunk.add_constant(Value::Int(42));
        chunk.write_op(OpCode::OpConstant, 1);
        chunk.write(index as u8, 1);
        chunk.write_op(OpCode::OpReturn, 2);

        let listing = disassemble_chunk(&chunk, "test");
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "== test ==");
        assert!(lines[1].starts_with("0000    1 OpConstant"));
        assert!(lines[1].ends_with("'42'"));
        assert_eq!(lines[2], "0002    2 OpReturn");
    }

    #[test]
    fn jumps_show_their_target() {
        let mut chunk = Chunk::new();
        chunk.write_op(OpCode::OpJump, 1);
        chunk.write(0, 1);
        chunk.write(1, 1);
        chunk.write_op(OpCode::OpPop, 1);
        chunk.write_op(OpCode::OpNull, 1);
        let (text, next) = disassemble_instruction(&chunk, 0);
        assert_eq!(next, 3);
        assert!(text.ends_with("-> 4"));
    }
}
