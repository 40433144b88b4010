use crate::error::RuntimeError;
use crate::vm::{upvalues, ExecutionState, VM};
use std::io::Write;

impl<W: Write> VM<W> {
    /// Handles OpReturn: pops the result, closes the frame's captured
    /// locals, and discards its stack window. Returning from the outermost
    /// frame ends the run and drops the result.
    pub(super) fn handle_return(&mut self) -> Result<ExecutionState, RuntimeError> {
        let result = self.pop()?;
        let slot = self.frame()?.slot;
        upvalues::close_upvalues(&mut self.open_upvalues, &self.stack, slot)?;
        self.frames.pop();
        self.stack.truncate(slot);

        if self.frames.is_empty() {
            return Ok(ExecutionState::Completed);
        }
        self.push(result)?;
        Ok(ExecutionState::Running)
    }
}
