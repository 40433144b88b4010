//! Scope-binding passes.
//!
//! [`Definer`] walks the whole tree once, attaching every node to its
//! enclosing scope, creating the scopes for blocks, loop headers, and
//! function bodies, and creating a symbol for every declaration. Parameters
//! are registered straight into their function's body scope.
//!
//! [`register_globals`] then registers the program's top-level declarations
//! in the global scope so globals are visible from anywhere. Local
//! declarations are registered later, in order, by the resolver.

use crate::ast::{Expr, ExprKind, FunctionDecl, Stmt, StmtKind, VarDecl};
use crate::error::Diagnostics;
use crate::token::Token;

use super::symbols::{ScopeId, Signature, Symbol, SymbolKind, SymbolTable, Type};
use super::{report, semantic_error};

pub struct Definer<'a> {
    table: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Definer<'a> {
    pub fn new(table: &'a mut SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        Definer { table, diagnostics }
    }

    pub fn define_program(&mut self, program: &mut Stmt) {
        let global = self.table.global();
        self.define_stmt(program, global);
    }

    fn define_stmt(&mut self, stmt: &mut Stmt, scope: ScopeId) {
        stmt.scope = Some(scope);
        match &mut stmt.kind {
            StmtKind::Expression(expression) => self.define_expr(expression, scope),
            StmtKind::Declaration(declaration) => self.define_variable(declaration, scope),
            StmtKind::Function(function) => self.define_function(function, scope),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.define_expr(value, scope);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.define_expr(condition, scope);
                self.define_stmt(then_branch, scope);
                if let Some(else_branch) = else_branch {
                    self.define_stmt(else_branch, scope);
                }
            }
            StmtKind::While { condition, body } => {
                self.define_expr(condition, scope);
                self.define_stmt(body, scope);
            }
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
                header_scope,
            } => {
                let header = self.table.push_scope(scope);
                *header_scope = Some(header);
                for statement in initializer.iter_mut() {
                    self.define_stmt(statement, header);
                }
                if let Some(condition) = condition {
                    self.define_expr(condition, header);
                }
                if let Some(increment) = increment {
                    self.define_expr(increment, header);
                }
                self.define_stmt(body, header);
            }
            StmtKind::Block(statements) => {
                let block = self.table.push_scope(scope);
                for statement in statements.iter_mut() {
                    self.define_stmt(statement, block);
                }
            }
            StmtKind::Sequence(statements) => {
                for statement in statements.iter_mut() {
                    self.define_stmt(statement, scope);
                }
            }
        }
    }

    fn define_variable(&mut self, declaration: &mut VarDecl, scope: ScopeId) {
        if let Some(initializer) = &mut declaration.initializer {
            self.define_expr(initializer, scope);
        }
        let ty = self.resolve_type_name(declaration.type_name.as_ref());
        let symbol = self
            .table
            .add_symbol(Symbol::variable(declaration.name.name.clone(), ty));
        declaration.name.symbol = Some(symbol);
    }

    fn define_function(&mut self, function: &mut FunctionDecl, scope: ScopeId) {
        let body_scope = self.table.push_scope(scope);
        function.body_scope = Some(body_scope);

        let mut params = Vec::with_capacity(function.params.len());
        for param in function.params.iter_mut() {
            let ty = self.resolve_type_name(param.type_name.as_ref());
            let symbol = self
                .table
                .add_symbol(Symbol::variable(param.name.name.clone(), ty));
            if self.table.insert(body_scope, symbol).is_err() {
                report(
                    self.diagnostics,
                    semantic_error(
                        &param.token,
                        format!("Duplicate parameter '{}'.", param.name.name),
                    ),
                );
            }
            param.name.symbol = Some(symbol);
            params.push(symbol);
        }

        let return_type = self.resolve_type_name(function.return_type.as_ref());
        let signature = Signature {
            params,
            return_type,
            variadic: false,
        };
        let symbol = self
            .table
            .add_symbol(Symbol::function(function.name.name.clone(), signature));
        function.name.symbol = Some(symbol);

        for statement in function.body.iter_mut() {
            self.define_stmt(statement, body_scope);
        }
    }

    fn define_expr(&mut self, expression: &mut Expr, scope: ScopeId) {
        expression.scope = Some(scope);
        match &mut expression.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
            ExprKind::Assign { value, .. } => self.define_expr(value, scope),
            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Relational { left, right, .. } => {
                self.define_expr(left, scope);
                self.define_expr(right, scope);
            }
            ExprKind::Unary { operand, .. } => self.define_expr(operand, scope),
            ExprKind::Call {
                callee, arguments, ..
            } => {
                self.define_expr(callee, scope);
                for argument in arguments.iter_mut() {
                    self.define_expr(argument, scope);
                }
            }
        }
    }

    /// Maps a type-name token to the builtin type it names.
    fn resolve_type_name(&mut self, type_name: Option<&Token>) -> Option<Type> {
        let token = type_name?;
        let global = self.table.global();
        let builtin = self
            .table
            .lookup_local(global, &token.lexeme)
            .and_then(|id| match self.table.symbol(id).kind {
                SymbolKind::BuiltinType(ty) => Some(ty),
                _ => None,
            });
        if builtin.is_none() {
            report(
                self.diagnostics,
                semantic_error(token, format!("Unknown type '{}'.", token.lexeme)),
            );
        }
        builtin
    }
}

/// Registers every declaration directly in the program's top-level sequence
/// (including multi-declarator sequences) in the global scope.
pub fn register_globals(program: &Stmt, table: &mut SymbolTable, diagnostics: &mut Diagnostics) {
    let global = table.global();
    for statement in program.statements() {
        register_global(statement, global, table, diagnostics);
    }
}

fn register_global(
    statement: &Stmt,
    global: ScopeId,
    table: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
) {
    let (name, symbol) = match &statement.kind {
        StmtKind::Declaration(declaration) => (&declaration.name, declaration.name.symbol),
        StmtKind::Function(function) => (&function.name, function.name.symbol),
        StmtKind::Sequence(statements) => {
            for inner in statements {
                register_global(inner, global, table, diagnostics);
            }
            return;
        }
        _ => return,
    };
    let Some(symbol) = symbol else {
        return;
    };
    if table.insert(global, symbol).is_err() {
        report(
            diagnostics,
            semantic_error(
                &statement.token,
                format!("'{}' is already declared in this scope.", name.name),
            ),
        );
    }
}
