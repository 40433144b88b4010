//! Bytecode reading utilities for the VM.
//!
//! Helpers for reading instructions and operands from the current frame.

use super::call_frame::CallFrame;
use super::VM;
use crate::bytecode::Chunk;
use crate::error::RuntimeError;
use crate::interner::ObjString;
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;

fn no_frame() -> RuntimeError {
    RuntimeError::MalformedBytecode("no active call frame".to_string())
}

impl<W: Write> VM<W> {
    pub(super) fn frame(&self) -> Result<&CallFrame, RuntimeError> {
        self.frames.last().ok_or_else(no_frame)
    }

    pub(super) fn frame_mut(&mut self) -> Result<&mut CallFrame, RuntimeError> {
        self.frames.last_mut().ok_or_else(no_frame)
    }

    /// The current call frame's bytecode chunk.
    pub(super) fn current_chunk(&self) -> Result<&Chunk, RuntimeError> {
        Ok(&self.frame()?.closure.function.chunk)
    }

    /// Reads the byte at the instruction pointer and advances it.
    pub(super) fn read_byte(&mut self) -> Result<u8, RuntimeError> {
        let frame = self.frames.last_mut().ok_or_else(no_frame)?;
        let byte = *frame
            .closure
            .function
            .chunk
            .code
            .get(frame.ip)
            .ok_or_else(|| RuntimeError::MalformedBytecode("ran past end of chunk".to_string()))?;
        frame.ip += 1;
        Ok(byte)
    }

    /// Reads a big-endian 16-bit operand.
    pub(super) fn read_u16(&mut self) -> Result<usize, RuntimeError> {
        let high = self.read_byte()? as usize;
        let low = self.read_byte()? as usize;
        Ok((high << 8) | low)
    }

    pub(super) fn read_constant(&mut self) -> Result<Value, RuntimeError> {
        let index = self.read_byte()? as usize;
        self.current_chunk()?
            .constants
            .get(index)
            .cloned()
            .ok_or_else(|| RuntimeError::MalformedBytecode(format!("no constant {}", index)))
    }

    /// Reads a constant operand that must be a string (a global's name).
    pub(super) fn read_string(&mut self) -> Result<Rc<ObjString>, RuntimeError> {
        let constant = self.read_constant()?;
        constant
            .as_string()
            .cloned()
            .map_err(|_| RuntimeError::MalformedBytecode("expected a name constant".to_string()))
    }
}
