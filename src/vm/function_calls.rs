use crate::error::RuntimeError;
use crate::object::{Closure, NativeFunction, Obj};
use crate::value::Value;
use crate::vm::call_frame::{CallFrame, FRAMES_MAX};
use crate::vm::VM;
use std::io::Write;
use std::rc::Rc;

impl<W: Write> VM<W> {
    /// Calls the value sitting below the top `arg_count` arguments.
    pub(super) fn call_value(&mut self, arg_count: usize) -> Result<(), RuntimeError> {
        let callee_index = self
            .stack
            .top()
            .checked_sub(arg_count + 1)
            .ok_or(RuntimeError::StackUnderflow)?;
        let callee = self.stack.get(callee_index)?.clone();
        match callee {
            Value::Obj(Obj::Closure(closure)) => {
                self.call_closure(closure, callee_index, arg_count)
            }
            Value::Obj(Obj::Native(native)) => self.call_native(&native, callee_index, arg_count),
            other => Err(RuntimeError::NotCallable(other.type_name().to_string())),
        }
    }

    /// Pushes a frame whose window starts at the callee's slot.
    pub(super) fn call_closure(
        &mut self,
        closure: Rc<Closure>,
        callee_index: usize,
        arg_count: usize,
    ) -> Result<(), RuntimeError> {
        let arity = closure.function.arity;
        if arg_count != arity {
            return Err(RuntimeError::ArityMismatch {
                expected: arity,
                got: arg_count,
            });
        }
        if self.frames.len() >= FRAMES_MAX {
            return Err(RuntimeError::StackOverflow);
        }
        log::trace!(
            "call {} with {} args at slot {}",
            closure.function.display_name(),
            arg_count,
            callee_index
        );
        self.frames.push(CallFrame::new(closure, callee_index));
        Ok(())
    }

    /// Runs a builtin immediately; its result replaces the callee and its
    /// arguments on the stack.
    fn call_native(
        &mut self,
        native: &NativeFunction,
        callee_index: usize,
        arg_count: usize,
    ) -> Result<(), RuntimeError> {
        if let Some(arity) = native.arity {
            if arity != arg_count {
                return Err(RuntimeError::ArityMismatch {
                    expected: arity,
                    got: arg_count,
                });
            }
        }
        let args = self.stack.window(callee_index + 1);
        let result = (native.function)(args, &mut self.out).map_err(|message| {
            RuntimeError::Native {
                name: native.name.to_string(),
                message,
            }
        })?;
        self.stack.truncate(callee_index);
        self.push(result)
    }
}
