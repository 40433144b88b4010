use crate::object::Closure;
use std::rc::Rc;

/// Maximum call depth.
pub const FRAMES_MAX: usize = 64;

/// One active function invocation.
pub struct CallFrame {
    pub closure: Rc<Closure>,
    pub ip: usize,
    /// Absolute stack index of the frame's slot 0 (the callee).
    pub slot: usize,
}

impl CallFrame {
    pub fn new(closure: Rc<Closure>, slot: usize) -> Self {
        Self {
            closure,
            ip: 0,
            slot,
        }
    }

    /// Source line of the instruction currently executing.
    pub fn line(&self) -> usize {
        self.closure.function.chunk.line_at(self.ip.saturating_sub(1))
    }

    /// `[line N] in name()` or `[line N] in script`.
    pub fn trace_entry(&self) -> String {
        match &self.closure.function.name {
            Some(name) => format!("[line {}] in {}()", self.line(), name),
            None => format!("[line {}] in script", self.line()),
        }
    }
}
