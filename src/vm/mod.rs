//! Stack-based virtual machine.
//!
//! A run starts by wrapping the compiled script in a closure and calling
//! it, then fetches and dispatches one instruction at a time until the
//! outermost frame returns or an instruction fails. After every run the VM
//! resets its stack, frames, and open upvalues; globals persist so a VM can
//! run several programs compiled against the same [`Interner`].

mod bytecode_reader;
mod call_frame;
mod function_calls;
pub mod native;
mod opcode_dispatcher;
pub mod opcodes;
mod return_handler;
mod stack_ops;
mod upvalues;

pub use call_frame::FRAMES_MAX;
pub use stack_ops::STACK_MAX;

use crate::bytecode::OpCode;
use crate::debug;
use crate::error::{RuntimeError, RuntimeFailure};
use crate::interner::{Interner, ObjString};
use crate::object::{Closure, Function, Obj, UpvalueRef};
use crate::table::Table;
use crate::value::Value;
use call_frame::CallFrame;
use stack_ops::Stack;
use std::io::Write;
use std::rc::Rc;

/// Whether the dispatch loop should keep going after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Running,
    Completed,
}

pub struct VM<W: Write> {
    stack: Stack,
    frames: Vec<CallFrame>,
    globals: Table,
    /// Head of the open upvalue list, highest stack slot first.
    open_upvalues: Option<UpvalueRef>,
    /// Sink for everything the program prints.
    out: W,
}

impl<W: Write> VM<W> {
    /// Creates a VM writing program output to `out`, with the builtins
    /// registered under names from `interner`.
    pub fn new(interner: &mut Interner, out: W) -> Self {
        let mut vm = VM {
            stack: Stack::new(),
            frames: Vec::with_capacity(FRAMES_MAX),
            globals: Table::new(),
            open_upvalues: None,
            out,
        };
        native::register_builtins(&mut vm.globals, interner);
        vm
    }

    /// Runs a compiled script to completion.
    pub fn interpret(&mut self, script: Rc<Function>) -> Result<(), RuntimeFailure> {
        log::debug!("interpreting {}", script.display_name());
        let outcome = self.start(script).and_then(|()| self.run());
        let result = outcome.map_err(|error| {
            let trace = self.stack_trace();
            log::debug!("runtime error: {} ({} frames)", error, trace.len());
            RuntimeFailure::new(error, trace)
        });
        self.reset();
        if let Err(err) = self.out.flush() {
            log::warn!("failed to flush program output: {}", err);
        }
        result
    }

    fn start(&mut self, script: Rc<Function>) -> Result<(), RuntimeError> {
        let closure = Rc::new(Closure::new(script, Vec::new()));
        self.push(Value::Obj(Obj::Closure(Rc::clone(&closure))))?;
        self.call_closure(closure, 0, 0)
    }

    fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            if log::log_enabled!(log::Level::Trace) {
                self.trace_instruction();
            }
            let byte = self.read_byte()?;
            let instruction = OpCode::try_from(byte).map_err(|byte| {
                RuntimeError::MalformedBytecode(format!("unknown opcode {}", byte))
            })?;
            if self.dispatch_opcode(instruction)? == ExecutionState::Completed {
                return Ok(());
            }
        }
    }

    fn trace_instruction(&self) {
        let Ok(frame) = self.frame() else {
            return;
        };
        let stack = self
            .stack
            .values()
            .iter()
            .map(|value| format!("[ {} ]", value))
            .collect::<String>();
        let (instruction, _) =
            debug::disassemble_instruction(&frame.closure.function.chunk, frame.ip);
        log::trace!("          {}", stack);
        log::trace!("{}", instruction);
    }

    /// `[line N] in ...` entries for the active frames, innermost first.
    fn stack_trace(&self) -> Vec<String> {
        self.frames.iter().rev().map(CallFrame::trace_entry).collect()
    }

    fn reset(&mut self) {
        self.stack.reset();
        self.frames.clear();
        self.open_upvalues = None;
    }

    /// Looks up a global by its interned name.
    pub fn global(&self, name: &Rc<ObjString>) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
