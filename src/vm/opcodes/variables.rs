//! Variable access operation handlers for the VM.
//!
//! - Global variables: `OpDefineGlobal`, `OpGetGlobal`, `OpSetGlobal`
//! - Local variables: `OpGetLocal`, `OpSetLocal`

use crate::error::RuntimeError;
use crate::interner::ObjString;
use crate::table::Table;
use crate::value::Value;
use crate::vm::stack_ops::Stack;
use std::rc::Rc;

/// Handler for OpDefineGlobal. Redefinition overwrites.
pub fn op_define_global(name: Rc<ObjString>, value: Value, globals: &mut Table) {
    globals.set(name, value);
}

/// Handler for OpGetGlobal. Reading an undefined global is an error.
pub fn op_get_global(name: &Rc<ObjString>, globals: &Table) -> Result<Value, RuntimeError> {
    globals
        .get(name)
        .cloned()
        .ok_or_else(|| RuntimeError::UndefinedGlobal(name.to_string()))
}

/// Handler for OpSetGlobal. Assigning an undefined global is an error and
/// leaves the table unchanged.
pub fn op_set_global(
    name: &Rc<ObjString>,
    value: Value,
    globals: &mut Table,
) -> Result<(), RuntimeError> {
    if globals.set(Rc::clone(name), value) {
        globals.delete(name);
        return Err(RuntimeError::UndefinedGlobal(name.to_string()));
    }
    Ok(())
}

/// Handler for OpGetLocal. `base` is the frame's slot 0.
pub fn op_get_local(slot: usize, base: usize, stack: &Stack) -> Result<Value, RuntimeError> {
    stack.get(base + slot).cloned()
}

/// Handler for OpSetLocal. The assigned value stays on top of the stack.
pub fn op_set_local(slot: usize, base: usize, stack: &mut Stack) -> Result<(), RuntimeError> {
    let value = stack.peek(0)?.clone();
    stack.set(base + slot, value)
}
