//! Code generation utilities for the compiler.
//!
//! Emitting bytes into the current chunk, managing the constant pool, and
//! writing and patching jumps.

use crate::bytecode::{OpCode, MAX_CONSTANTS};
use crate::object::Obj;
use crate::value::Value;

use super::types::VariableTarget;

impl super::Compiler<'_> {
    pub(super) fn emit_byte(&mut self, byte: u8) {
        let line = self.line;
        self.current_mut().chunk.write(byte, line);
    }

    pub(super) fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op.into());
    }

    /// Emits an instruction with a one-byte operand.
    pub(super) fn emit_op_operand(&mut self, op: OpCode, operand: u8) {
        self.emit_op(op);
        self.emit_byte(operand);
    }

    /// Emits the implicit `return null` that ends every function.
    pub(super) fn emit_return(&mut self) {
        self.emit_op(OpCode::OpNull);
        self.emit_op(OpCode::OpReturn);
    }

    /// Adds `value` to the constant pool, reporting an error once the pool
    /// no longer fits a byte operand.
    pub(super) fn make_constant(&mut self, value: Value) -> u8 {
        let index = self.current_mut().chunk.add_constant(value);
        if index >= MAX_CONSTANTS {
            self.error("Too many constants in one chunk.");
            return 0;
        }
        index as u8
    }

    pub(super) fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_op_operand(OpCode::OpConstant, index);
    }

    /// Interns `name` and stores it in the constant pool.
    pub(super) fn identifier_constant(&mut self, name: &str) -> u8 {
        let string = self.interner.intern(name);
        self.make_constant(Value::Obj(Obj::String(string)))
    }

    pub(super) fn emit_get_variable(&mut self, name: &str, target: VariableTarget) {
        match target {
            VariableTarget::Local(slot) => self.emit_op_operand(OpCode::OpGetLocal, slot),
            VariableTarget::Upvalue(index) => self.emit_op_operand(OpCode::OpGetUpvalue, index),
            VariableTarget::Global => {
                let constant = self.identifier_constant(name);
                self.emit_op_operand(OpCode::OpGetGlobal, constant);
            }
        }
    }

    pub(super) fn emit_set_variable(&mut self, name: &str, target: VariableTarget) {
        match target {
            VariableTarget::Local(slot) => self.emit_op_operand(OpCode::OpSetLocal, slot),
            VariableTarget::Upvalue(index) => self.emit_op_operand(OpCode::OpSetUpvalue, index),
            VariableTarget::Global => {
                let constant = self.identifier_constant(name);
                self.emit_op_operand(OpCode::OpSetGlobal, constant);
            }
        }
    }

    /// Emits a jump with a placeholder operand and returns the operand's
    /// offset for [`patch_jump`](Self::patch_jump).
    pub(super) fn emit_jump(&mut self, instruction: OpCode) -> usize {
        self.emit_op(instruction);
        self.emit_byte(0xff);
        self.emit_byte(0xff);
        self.current().chunk.len() - 2
    }

    /// Points a previously emitted jump at the current end of the chunk.
    pub(super) fn patch_jump(&mut self, operand_index: usize) {
        let jump = self.current().chunk.len() - (operand_index + 2);
        if jump > u16::MAX as usize {
            self.error("Too much code to jump over.");
            return;
        }
        let code = &mut self.current_mut().chunk.code;
        code[operand_index] = ((jump >> 8) & 0xff) as u8;
        code[operand_index + 1] = (jump & 0xff) as u8;
    }

    /// Emits a backward jump to `loop_start`.
    pub(super) fn emit_loop(&mut self, loop_start: usize) {
        self.emit_op(OpCode::OpLoop);
        let offset = self.current().chunk.len() - loop_start + 2;
        if offset > u16::MAX as usize {
            self.error("Loop body too large.");
        }
        self.emit_byte(((offset >> 8) & 0xff) as u8);
        self.emit_byte((offset & 0xff) as u8);
    }

    /// Offset of the next instruction to be emitted.
    pub(super) fn code_offset(&self) -> usize {
        self.current().chunk.len()
    }
}
