//! Statement lowering.

use crate::ast::{Expr, FunctionDecl, Identifier, Stmt, StmtKind, VarDecl};
use crate::bytecode::OpCode;
use crate::object::Obj;
use crate::value::Value;
use std::rc::Rc;

use super::types::{FunctionKind, FunctionScope, MAX_PARAMETERS};

impl super::Compiler<'_> {
    pub(super) fn compile_stmt(&mut self, stmt: &Stmt) {
        self.locate(&stmt.token);
        match &stmt.kind {
            StmtKind::Expression(expression) => {
                self.compile_expr(expression);
                self.emit_op(OpCode::OpPop);
            }
            StmtKind::Declaration(declaration) => self.compile_declaration(declaration),
            StmtKind::Function(function) => self.compile_function_declaration(function),
            StmtKind::Return(value) => self.compile_return(value.as_ref()),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.compile_if(condition, then_branch, else_branch.as_deref()),
            StmtKind::While { condition, body } => self.compile_while(condition, body),
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
                ..
            } => self.compile_for(initializer, condition.as_ref(), increment.as_ref(), body),
            StmtKind::Block(statements) => {
                self.begin_scope();
                for statement in statements {
                    self.compile_stmt(statement);
                }
                self.end_scope();
            }
            StmtKind::Sequence(statements) => {
                for statement in statements {
                    self.compile_stmt(statement);
                }
            }
        }
    }

    /// Globals are defined by name. A local is declared before its
    /// initializer runs but only becomes visible afterwards; its value is
    /// left in its stack slot.
    fn compile_declaration(&mut self, declaration: &VarDecl) {
        let global = self.current().is_global_level();
        if !global {
            self.declare_local(&declaration.name.name);
        }
        match &declaration.initializer {
            Some(initializer) => self.compile_expr(initializer),
            None => self.emit_op(OpCode::OpNull),
        }
        self.define_variable(&declaration.name, global);
    }

    fn define_variable(&mut self, name: &Identifier, global: bool) {
        if global {
            let constant = self.identifier_constant(&name.name);
            self.emit_op_operand(OpCode::OpDefineGlobal, constant);
        } else {
            self.mark_initialized();
        }
    }

    fn compile_function_declaration(&mut self, function: &FunctionDecl) {
        let global = self.current().is_global_level();
        if !global {
            // Visible inside its own body for recursion.
            self.declare_local(&function.name.name);
            self.mark_initialized();
        }
        self.compile_function(function);
        if global {
            let constant = self.identifier_constant(&function.name.name);
            self.emit_op_operand(OpCode::OpDefineGlobal, constant);
        }
    }

    /// Compiles a function body into its own chunk and emits the closure
    /// that wraps it.
    fn compile_function(&mut self, function: &FunctionDecl) {
        let name = self.interner.intern(&function.name.name);
        self.function_scopes
            .push(FunctionScope::new(FunctionKind::Function, Some(name)));
        self.begin_scope();

        if function.params.len() > MAX_PARAMETERS {
            self.error(format!("Can't have more than {} parameters.", MAX_PARAMETERS));
        }
        self.current_mut().arity = function.params.len();
        for param in &function.params {
            self.locate(&param.token);
            self.declare_local(&param.name.name);
            self.mark_initialized();
        }
        for statement in &function.body {
            self.compile_stmt(statement);
        }

        let upvalues = self.current().upvalues.clone();
        let compiled = self.end_function();
        let constant = self.make_constant(Value::Obj(Obj::Function(Rc::new(compiled))));
        self.emit_op_operand(OpCode::OpClosure, constant);
        for upvalue in upvalues {
            self.emit_byte(u8::from(upvalue.is_local));
            self.emit_byte(upvalue.index);
        }
    }

    fn compile_return(&mut self, value: Option<&Expr>) {
        if self.current().kind == FunctionKind::Script {
            self.error("Can't return from top-level code.");
            return;
        }
        match value {
            Some(value) => self.compile_expr(value),
            None => self.emit_op(OpCode::OpNull),
        }
        self.emit_op(OpCode::OpReturn);
    }

    fn compile_if(&mut self, condition: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        self.compile_expr(condition);
        let then_jump = self.emit_jump(OpCode::OpJumpIfFalse);
        self.emit_op(OpCode::OpPop);
        self.compile_stmt(then_branch);

        let else_jump = self.emit_jump(OpCode::OpJump);
        self.patch_jump(then_jump);
        self.emit_op(OpCode::OpPop);
        if let Some(else_branch) = else_branch {
            self.compile_stmt(else_branch);
        }
        self.patch_jump(else_jump);
    }

    fn compile_while(&mut self, condition: &Expr, body: &Stmt) {
        let loop_start = self.code_offset();
        self.compile_expr(condition);
        let exit_jump = self.emit_jump(OpCode::OpJumpIfFalse);
        self.emit_op(OpCode::OpPop);
        self.compile_stmt(body);
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_op(OpCode::OpPop);
    }

    fn compile_for(
        &mut self,
        initializer: &[Stmt],
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &Stmt,
    ) {
        self.begin_scope();
        for statement in initializer {
            self.compile_stmt(statement);
        }

        let mut loop_start = self.code_offset();
        let exit_jump = condition.map(|condition| {
            self.compile_expr(condition);
            let jump = self.emit_jump(OpCode::OpJumpIfFalse);
            self.emit_op(OpCode::OpPop);
            jump
        });

        // The increment runs after the body, so jump over it on entry.
        if let Some(increment) = increment {
            let body_jump = self.emit_jump(OpCode::OpJump);
            let increment_start = self.code_offset();
            self.compile_expr(increment);
            self.emit_op(OpCode::OpPop);
            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.compile_stmt(body);
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit_op(OpCode::OpPop);
        }
        self.end_scope();
    }
}
