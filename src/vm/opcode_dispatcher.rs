//! Opcode dispatching for the VM.
//!
//! Executes one decoded instruction against the current frame.

use super::{ExecutionState, VM};
use crate::bytecode::OpCode;
use crate::error::RuntimeError;
use crate::object::{Closure, Obj, UpvalueRef};
use crate::value::Value;
use crate::vm::opcodes::{arithmetic, comparison, variables};
use crate::vm::upvalues;
use std::io::Write;
use std::rc::Rc;

impl<W: Write> VM<W> {
    pub(super) fn dispatch_opcode(
        &mut self,
        instruction: OpCode,
    ) -> Result<ExecutionState, RuntimeError> {
        match instruction {
            OpCode::OpConstant => {
                let constant = self.read_constant()?;
                self.push(constant)?;
            }
            OpCode::OpNull => self.push(Value::Null)?,
            OpCode::OpTrue => self.push(Value::Bool(true))?,
            OpCode::OpFalse => self.push(Value::Bool(false))?,
            OpCode::OpPop => {
                self.pop()?;
            }
            OpCode::OpDefineGlobal => {
                let name = self.read_string()?;
                let value = self.pop()?;
                variables::op_define_global(name, value, &mut self.globals);
            }
            OpCode::OpGetGlobal => {
                let name = self.read_string()?;
                let value = variables::op_get_global(&name, &self.globals)?;
                self.push(value)?;
            }
            OpCode::OpSetGlobal => {
                let name = self.read_string()?;
                let value = self.peek(0)?.clone();
                variables::op_set_global(&name, value, &mut self.globals)?;
            }
            OpCode::OpGetUpvalue => {
                let index = self.read_byte()? as usize;
                let upvalue = self.upvalue(index)?;
                let value = upvalues::read_upvalue(&upvalue, &self.stack)?;
                self.push(value)?;
            }
            OpCode::OpSetUpvalue => {
                let index = self.read_byte()? as usize;
                let upvalue = self.upvalue(index)?;
                let value = self.peek(0)?.clone();
                upvalues::write_upvalue(&upvalue, &mut self.stack, value)?;
            }
            OpCode::OpGetLocal => {
                let slot = self.read_byte()? as usize;
                let base = self.frame()?.slot;
                let value = variables::op_get_local(slot, base, &self.stack)?;
                self.push(value)?;
            }
            OpCode::OpSetLocal => {
                let slot = self.read_byte()? as usize;
                let base = self.frame()?.slot;
                variables::op_set_local(slot, base, &mut self.stack)?;
            }
            OpCode::OpEqual | OpCode::OpNotEqual => {
                let b = self.pop()?;
                let a = self.pop()?;
                let equal = comparison::values_equal(&a, &b);
                self.push(Value::Bool(equal == (instruction == OpCode::OpEqual)))?;
            }
            OpCode::OpGreater | OpCode::OpGreaterEqual | OpCode::OpLess | OpCode::OpLessEqual => {
                let b = self.pop()?;
                let a = self.pop()?;
                let result = comparison::op_compare(instruction, &a, &b)?;
                self.push(result)?;
            }
            OpCode::OpAdd | OpCode::OpSubtract | OpCode::OpMultiply | OpCode::OpDivide => {
                let b = self.pop()?;
                let a = self.pop()?;
                let result = match instruction {
                    OpCode::OpAdd => arithmetic::op_add(&a, &b),
                    OpCode::OpSubtract => arithmetic::op_subtract(&a, &b),
                    OpCode::OpMultiply => arithmetic::op_multiply(&a, &b),
                    _ => arithmetic::op_divide(&a, &b),
                }?;
                self.push(result)?;
            }
            OpCode::OpNot => {
                let value = self.pop()?;
                self.push(arithmetic::op_not(&value))?;
            }
            OpCode::OpNegate => {
                let value = self.pop()?;
                self.push(arithmetic::op_negate(&value)?)?;
            }
            OpCode::OpCall => {
                let arg_count = self.read_byte()? as usize;
                self.call_value(arg_count)?;
            }
            OpCode::OpClosure => self.make_closure()?,
            OpCode::OpCloseUpvalue => {
                let top = self.stack.top().saturating_sub(1);
                upvalues::close_upvalues(&mut self.open_upvalues, &self.stack, top)?;
                self.pop()?;
            }
            OpCode::OpJump => {
                let offset = self.read_u16()?;
                self.jump_forward(offset)?;
            }
            OpCode::OpJumpIfFalse => {
                let offset = self.read_u16()?;
                if self.peek(0)?.is_falsey() {
                    self.jump_forward(offset)?;
                }
            }
            OpCode::OpLoop => {
                let offset = self.read_u16()?;
                let frame = self.frame_mut()?;
                frame.ip = frame.ip.checked_sub(offset).ok_or_else(|| {
                    RuntimeError::MalformedBytecode("loop target before chunk start".to_string())
                })?;
            }
            OpCode::OpReturn => return self.handle_return(),
        }
        Ok(ExecutionState::Running)
    }

    fn jump_forward(&mut self, offset: usize) -> Result<(), RuntimeError> {
        let frame = self.frame_mut()?;
        frame.ip += offset;
        Ok(())
    }

    fn upvalue(&self, index: usize) -> Result<UpvalueRef, RuntimeError> {
        self.frame()?
            .closure
            .upvalues
            .get(index)
            .cloned()
            .ok_or_else(|| RuntimeError::MalformedBytecode(format!("no upvalue {}", index)))
    }

    /// Handles OpClosure: wraps a function constant, capturing each
    /// variable described by the `(is_local, index)` pairs that follow.
    fn make_closure(&mut self) -> Result<(), RuntimeError> {
        let function = Rc::clone(self.read_constant()?.as_function()?);
        let mut captured = Vec::with_capacity(function.upvalue_count);
        for _ in 0..function.upvalue_count {
            let is_local = self.read_byte()? == 1;
            let index = self.read_byte()? as usize;
            let upvalue = if is_local {
                let slot = self.frame()?.slot + index;
                upvalues::capture_upvalue(&mut self.open_upvalues, slot)
            } else {
                self.upvalue(index)?
            };
            captured.push(upvalue);
        }
        let closure = Closure::new(function, captured);
        self.push(Value::Obj(Obj::Closure(Rc::new(closure))))
    }
}
