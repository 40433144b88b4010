//! Captured-variable management.
//!
//! Open upvalues form a singly linked list ordered by descending stack slot,
//! headed by the VM's `open_upvalues`. At most one open upvalue exists per
//! slot, so closures capturing the same variable share it.

use crate::error::RuntimeError;
use crate::object::{Upvalue, UpvalueRef, UpvalueState};
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

use super::stack_ops::Stack;

/// Returns the open upvalue for stack `slot`, creating and linking it in
/// slot order if none exists yet.
pub fn capture_upvalue(open_upvalues: &mut Option<UpvalueRef>, slot: usize) -> UpvalueRef {
    let mut previous: Option<UpvalueRef> = None;
    let mut current = open_upvalues.clone();
    while let Some(upvalue) = current.clone() {
        match upvalue.borrow().slot() {
            Some(existing) if existing > slot => {}
            _ => break,
        }
        current = upvalue.borrow().next.clone();
        previous = Some(upvalue);
    }

    if let Some(existing) = &current {
        if existing.borrow().slot() == Some(slot) {
            return Rc::clone(existing);
        }
    }

    let created = Rc::new(RefCell::new(Upvalue::new(slot, current)));
    match previous {
        Some(previous) => previous.borrow_mut().next = Some(Rc::clone(&created)),
        None => *open_upvalues = Some(Rc::clone(&created)),
    }
    created
}

/// Closes every open upvalue whose slot is at or above `last`, copying the
/// slot's value off the stack into the upvalue.
pub fn close_upvalues(
    open_upvalues: &mut Option<UpvalueRef>,
    stack: &Stack,
    last: usize,
) -> Result<(), RuntimeError> {
    while let Some(upvalue) = open_upvalues.clone() {
        let slot = match upvalue.borrow().slot() {
            Some(slot) if slot >= last => slot,
            _ => break,
        };
        let value = stack.get(slot)?.clone();
        let mut closing = upvalue.borrow_mut();
        closing.state = UpvalueState::Closed(value);
        *open_upvalues = closing.next.take();
    }
    Ok(())
}

/// Current value of a captured variable.
pub fn read_upvalue(upvalue: &UpvalueRef, stack: &Stack) -> Result<Value, RuntimeError> {
    match &upvalue.borrow().state {
        UpvalueState::Open(slot) => stack.get(*slot).cloned(),
        UpvalueState::Closed(value) => Ok(value.clone()),
    }
}

/// Assigns a captured variable, wherever it currently lives.
pub fn write_upvalue(
    upvalue: &UpvalueRef,
    stack: &mut Stack,
    value: Value,
) -> Result<(), RuntimeError> {
    let mut upvalue = upvalue.borrow_mut();
    match &mut upvalue.state {
        UpvalueState::Open(slot) => stack.set(*slot, value),
        UpvalueState::Closed(closed) => {
            *closed = value;
            Ok(())
        }
    }
}
