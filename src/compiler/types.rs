//! Supporting types for the compiler: per-function scope state and
//! variable storage targets.

use crate::bytecode::Chunk;
use crate::interner::ObjString;
use crate::object::UpvalueDescriptor;
use std::rc::Rc;

/// Maximum number of local slots in one function, including slot 0.
pub(super) const MAX_LOCALS: usize = 255;
/// Maximum number of variables one function can capture.
pub(super) const MAX_UPVALUES: usize = 255;
/// Maximum number of parameters and call arguments.
pub(super) const MAX_PARAMETERS: usize = 255;

/// Whether a function scope compiles the top-level script or a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FunctionKind {
    Script,
    Function,
}

/// Where a variable is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VariableTarget {
    /// Local slot relative to the frame base.
    Local(u8),
    /// Index into the running closure's upvalues.
    Upvalue(u8),
    /// Global, looked up by name.
    Global,
}

/// A local variable slot.
#[derive(Debug, Clone)]
pub(super) struct Local {
    pub(super) name: Rc<str>,
    /// Block depth of the declaration; `None` until its initializer has
    /// been compiled.
    pub(super) depth: Option<usize>,
    /// Set when an inner function captures this slot, so leaving its scope
    /// closes the upvalue instead of just popping.
    pub(super) is_captured: bool,
}

impl Local {
    pub(super) fn new(name: Rc<str>) -> Self {
        Local {
            name,
            depth: None,
            is_captured: false,
        }
    }
}

/// Compilation state of one function (or the script): the chunk being
/// written, its local slots, and the variables it captures.
#[derive(Debug)]
pub(super) struct FunctionScope {
    pub(super) kind: FunctionKind,
    pub(super) name: Option<Rc<ObjString>>,
    pub(super) arity: usize,
    pub(super) chunk: Chunk,
    pub(super) locals: Vec<Local>,
    pub(super) upvalues: Vec<UpvalueDescriptor>,
    pub(super) scope_depth: usize,
}

impl FunctionScope {
    pub(super) fn new(kind: FunctionKind, name: Option<Rc<ObjString>>) -> Self {
        // Slot 0 holds the callee itself and is never addressable by name.
        let reserved = Local {
            name: Rc::from(""),
            depth: Some(0),
            is_captured: false,
        };
        FunctionScope {
            kind,
            name,
            arity: 0,
            chunk: Chunk::new(),
            locals: vec![reserved],
            upvalues: Vec::new(),
            scope_depth: 0,
        }
    }

    /// Finds the most recent initialized local named `name`. Locals whose
    /// initializer is still being compiled are skipped.
    pub(super) fn resolve(&self, name: &str) -> Option<usize> {
        self.locals
            .iter()
            .rposition(|local| local.depth.is_some() && &*local.name == name)
    }

    /// True if a local named `name` is declared but not yet initialized.
    pub(super) fn is_initializing(&self, name: &str) -> bool {
        self.locals
            .iter()
            .any(|local| local.depth.is_none() && &*local.name == name)
    }

    /// True if `name` is already declared in the innermost block.
    pub(super) fn declared_in_current_block(&self, name: &str) -> bool {
        self.locals
            .iter()
            .rev()
            .take_while(|local| local.depth.map_or(true, |depth| depth >= self.scope_depth))
            .any(|local| &*local.name == name)
    }

    /// Returns the index of an equivalent upvalue, if this function already
    /// captures the same source.
    pub(super) fn find_upvalue(&self, is_local: bool, index: u8) -> Option<usize> {
        self.upvalues
            .iter()
            .position(|upvalue| upvalue.is_local == is_local && upvalue.index == index)
    }

    /// True at the script's outermost level, where declarations are global.
    pub(super) fn is_global_level(&self) -> bool {
        self.kind == FunctionKind::Script && self.scope_depth == 0
    }
}
