//! Scope and variable resolution for the compiler.
//!
//! Block scopes, local slot allocation, and resolving names to their
//! storage: a local slot, an upvalue, or a global.

use crate::ast::Identifier;
use crate::bytecode::OpCode;
use crate::object::UpvalueDescriptor;
use std::rc::Rc;

use super::types::{Local, VariableTarget, MAX_LOCALS, MAX_UPVALUES};

impl super::Compiler<'_> {
    pub(super) fn begin_scope(&mut self) {
        self.current_mut().scope_depth += 1;
    }

    /// Leaves a block, discarding its locals from the stack. Captured locals
    /// are closed into their upvalue rather than just popped.
    pub(super) fn end_scope(&mut self) {
        self.current_mut().scope_depth -= 1;
        loop {
            let scope = self.current();
            let Some(local) = scope.locals.last() else {
                break;
            };
            if local.depth.map_or(true, |depth| depth <= scope.scope_depth) {
                break;
            }
            let op = if local.is_captured {
                OpCode::OpCloseUpvalue
            } else {
                OpCode::OpPop
            };
            self.emit_op(op);
            self.current_mut().locals.pop();
        }
    }

    /// Adds an uninitialized local for `name` to the current block.
    pub(super) fn declare_local(&mut self, name: &Rc<str>) {
        if self.current().declared_in_current_block(name) {
            self.error(format!(
                "Already a variable named '{}' in this scope.",
                name
            ));
        }
        if self.current().locals.len() >= MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.current_mut().locals.push(Local::new(Rc::clone(name)));
    }

    /// Marks the most recently declared local as initialized.
    pub(super) fn mark_initialized(&mut self) {
        let scope = self.current_mut();
        let depth = scope.scope_depth;
        if let Some(local) = scope.locals.last_mut() {
            local.depth = Some(depth);
        }
    }

    /// Resolves `identifier` to where its value lives.
    pub(super) fn resolve_variable(&mut self, identifier: &Identifier) -> VariableTarget {
        let name = &*identifier.name;
        let current = self.function_scopes.len() - 1;
        if let Some(slot) = self.function_scopes[current].resolve(name) {
            return VariableTarget::Local(slot as u8);
        }
        if let Some(index) = self.resolve_upvalue(current, name) {
            return VariableTarget::Upvalue(index as u8);
        }
        if self.function_scopes[current].is_initializing(name) && !self.is_known_global(identifier)
        {
            self.error("Can't read local variable in its own initializer.");
        }
        VariableTarget::Global
    }

    /// Looks for `name` in the functions enclosing `scope_index`, threading
    /// an upvalue through every function in between.
    pub(super) fn resolve_upvalue(&mut self, scope_index: usize, name: &str) -> Option<usize> {
        if scope_index == 0 {
            return None;
        }
        let parent = scope_index - 1;
        if let Some(local) = self.function_scopes[parent].resolve(name) {
            self.function_scopes[parent].locals[local].is_captured = true;
            return Some(self.add_upvalue(scope_index, true, local as u8));
        }
        let upvalue = self.resolve_upvalue(parent, name)?;
        Some(self.add_upvalue(scope_index, false, upvalue as u8))
    }

    fn add_upvalue(&mut self, scope_index: usize, is_local: bool, index: u8) -> usize {
        let scope = &mut self.function_scopes[scope_index];
        if let Some(existing) = scope.find_upvalue(is_local, index) {
            return existing;
        }
        if scope.upvalues.len() >= MAX_UPVALUES {
            self.error("Too many closure variables in function.");
            return 0;
        }
        scope.upvalues.push(UpvalueDescriptor { is_local, index });
        scope.upvalues.len() - 1
    }

    /// True if semantic analysis resolved `identifier` to a global symbol.
    fn is_known_global(&self, identifier: &Identifier) -> bool {
        match (self.symbols, identifier.symbol) {
            (Some(table), Some(symbol)) => table.is_global_symbol(symbol),
            _ => false,
        }
    }
}
