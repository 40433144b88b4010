//! Bytecode compiler.
//!
//! Lowers an analyzed syntax tree into a [`Function`] for the top-level
//! script, with one nested [`Function`] constant per function declaration.
//! The compiler keeps a stack of [`FunctionScope`](types::FunctionScope)s
//! mirroring function nesting; each tracks its local slots and the upvalues
//! it captures from enclosing functions.
//!
//! Compile-time limits (locals, upvalues, constants, jump distances) and
//! misplaced `return`s are recorded as diagnostics; a program that produced
//! any diagnostic is never handed to the VM.

mod codegen;
mod expressions;
mod scope;
mod statements;
mod types;

use crate::ast::Stmt;
use crate::error::{Diagnostic, Diagnostics, ErrorCategory};
use crate::interner::Interner;
use crate::object::Function;
use crate::semantic::SymbolTable;
use crate::token::Token;
use std::rc::Rc;
use types::{FunctionKind, FunctionScope};

pub struct Compiler<'a> {
    interner: &'a mut Interner,
    /// Symbol table from semantic analysis, used to tell globals apart from
    /// locals that are still being initialized.
    symbols: Option<&'a SymbolTable>,
    function_scopes: Vec<FunctionScope>,
    diagnostics: Diagnostics,
    file: Rc<str>,
    line: usize,
    column: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(interner: &'a mut Interner, symbols: Option<&'a SymbolTable>) -> Self {
        Compiler {
            interner,
            symbols,
            function_scopes: vec![FunctionScope::new(FunctionKind::Script, None)],
            diagnostics: Diagnostics::new(),
            file: Rc::from(""),
            line: 0,
            column: 0,
        }
    }

    /// Compiles `program` into the script function.
    pub fn compile(mut self, program: &Stmt) -> Result<Rc<Function>, Diagnostics> {
        self.locate(&program.token);
        self.compile_stmt(program);
        let script = self.end_function();
        if self.diagnostics.had_errors() {
            return Err(self.diagnostics);
        }
        log::debug!(
            "compiled script: {} bytes, {} constants",
            script.chunk.len(),
            script.chunk.constants.len()
        );
        Ok(Rc::new(script))
    }

    /// Records the source position used for emitted line info and errors.
    fn locate(&mut self, token: &Token) {
        self.file = Rc::clone(&token.file);
        self.line = token.line;
        self.column = token.column;
    }

    fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.report(Diagnostic {
            category: ErrorCategory::Compile,
            file: Rc::clone(&self.file),
            line: self.line,
            column: self.column,
            message: message.into(),
        });
    }

    fn current(&self) -> &FunctionScope {
        let index = self.function_scopes.len() - 1;
        &self.function_scopes[index]
    }

    fn current_mut(&mut self) -> &mut FunctionScope {
        let index = self.function_scopes.len() - 1;
        &mut self.function_scopes[index]
    }

    /// Finishes the innermost function scope with an implicit `null` return.
    fn end_function(&mut self) -> Function {
        self.emit_return();
        let scope = self
            .function_scopes
            .pop()
            .unwrap_or_else(|| FunctionScope::new(FunctionKind::Script, None));
        let function = Function {
            name: scope.name,
            arity: scope.arity,
            upvalue_count: scope.upvalues.len(),
            chunk: scope.chunk,
        };
        crate::debug::trace_chunk(&function.chunk, function.display_name());
        function
    }
}

/// Compiles `program` with a fresh compiler.
pub fn compile(
    program: &Stmt,
    interner: &mut Interner,
    symbols: Option<&SymbolTable>,
) -> Result<Rc<Function>, Diagnostics> {
    Compiler::new(interner, symbols).compile(program)
}
