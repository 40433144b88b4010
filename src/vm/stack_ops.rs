use crate::error::RuntimeError;
use crate::value::Value;

use super::call_frame::FRAMES_MAX;

/// Capacity of the value stack.
pub const STACK_MAX: usize = FRAMES_MAX * 256;

/// The VM's operand stack. Capacity is fixed; pushing past it or popping an
/// empty stack is reported as an error.
pub struct Stack {
    data: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            data: Vec::with_capacity(STACK_MAX),
        }
    }

    #[inline]
    pub fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.data.len() >= STACK_MAX {
            return Err(RuntimeError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.data.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Distance 0 is the top of the stack.
    #[inline]
    pub fn peek(&self, distance: usize) -> Result<&Value, RuntimeError> {
        self.data
            .len()
            .checked_sub(distance + 1)
            .map(|index| &self.data[index])
            .ok_or(RuntimeError::StackUnderflow)
    }

    #[inline]
    pub fn top(&self) -> usize {
        self.data.len()
    }

    /// Drops every value at or above `top`.
    #[inline]
    pub fn truncate(&mut self, top: usize) {
        self.data.truncate(top);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Result<&Value, RuntimeError> {
        self.data.get(index).ok_or(RuntimeError::StackUnderflow)
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let slot = self.data.get_mut(index).ok_or(RuntimeError::StackUnderflow)?;
        *slot = value;
        Ok(())
    }

    /// Values from `start` to the top.
    pub fn window(&self, start: usize) -> &[Value] {
        self.data.get(start..).unwrap_or(&[])
    }

    pub fn reset(&mut self) {
        self.data.clear();
    }

    pub fn values(&self) -> &[Value] {
        &self.data
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

use super::VM;
use std::io::Write;

impl<W: Write> VM<W> {
    #[inline]
    pub(super) fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        self.stack.push(value)
    }

    #[inline]
    pub(super) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop()
    }

    #[inline]
    pub(super) fn peek(&self, distance: usize) -> Result<&Value, RuntimeError> {
        self.stack.peek(distance)
    }

    /// Number of values currently on the stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_and_underflow_are_errors() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop().unwrap_err(), RuntimeError::StackUnderflow);
        for i in 0..STACK_MAX {
            stack.push(Value::Int(i as i64)).unwrap();
        }
        assert_eq!(stack.push(Value::Null), Err(RuntimeError::StackOverflow));
        assert_eq!(stack.peek(0).unwrap(), &Value::Int(STACK_MAX as i64 - 1));
    }

    #[test]
    fn window_and_truncate() {
        let mut stack = Stack::new();
        for i in 0..4 {
            stack.push(Value::Int(i)).unwrap();
        }
        assert_eq!(stack.window(2), &[Value::Int(2), Value::Int(3)]);
        stack.truncate(1);
        assert_eq!(stack.top(), 1);
        assert!(stack.peek(1).is_err());
    }
}
