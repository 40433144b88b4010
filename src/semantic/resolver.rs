use crate::ast::{Expr, ExprKind, FunctionDecl, Identifier, Stmt, StmtKind, VarDecl};
use crate::error::Diagnostics;
use crate::token::Token;

use super::symbols::{ScopeId, SymbolId, SymbolKind, SymbolTable};
use super::{report, semantic_error};

/// Resolves every identifier, assignment target, and callee to a symbol.
///
/// Local declarations are registered as the walk reaches them, after their
/// initializer has been resolved, so inside `var x = x;` the initializer
/// sees the enclosing `x`. Unresolved names are reported and the walk
/// continues.
pub struct Resolver<'a> {
    table: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a mut SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        Resolver { table, diagnostics }
    }

    pub fn resolve_program(&mut self, program: &mut Stmt) {
        self.resolve_stmt(program);
    }

    fn resolve_stmt(&mut self, stmt: &mut Stmt) {
        let scope = stmt.scope.unwrap_or_else(|| self.table.global());
        match &mut stmt.kind {
            StmtKind::Expression(expression) => self.resolve_expr(expression),
            StmtKind::Declaration(declaration) => {
                self.resolve_declaration(declaration, scope, &stmt.token)
            }
            StmtKind::Function(function) => self.resolve_function(function, scope, &stmt.token),
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
                ..
            } => {
                for statement in initializer.iter_mut() {
                    self.resolve_stmt(statement);
                }
                if let Some(condition) = condition {
                    self.resolve_expr(condition);
                }
                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }
                self.resolve_stmt(body);
            }
            StmtKind::Block(statements) | StmtKind::Sequence(statements) => {
                for statement in statements.iter_mut() {
                    self.resolve_stmt(statement);
                }
            }
        }
    }

    fn resolve_declaration(&mut self, declaration: &mut VarDecl, scope: ScopeId, token: &Token) {
        if let Some(initializer) = &mut declaration.initializer {
            self.resolve_expr(initializer);
        }
        if scope != self.table.global() {
            self.register_local(&declaration.name, scope, token);
        }
    }

    fn resolve_function(&mut self, function: &mut FunctionDecl, scope: ScopeId, token: &Token) {
        // Registered before the body so local functions can recurse.
        if scope != self.table.global() {
            self.register_local(&function.name, scope, token);
        }
        for statement in function.body.iter_mut() {
            self.resolve_stmt(statement);
        }
    }

    fn register_local(&mut self, name: &Identifier, scope: ScopeId, token: &Token) {
        let Some(symbol) = name.symbol else {
            return;
        };
        if self.table.insert(scope, symbol).is_err() {
            report(
                self.diagnostics,
                semantic_error(
                    token,
                    format!("'{}' is already declared in this scope.", name.name),
                ),
            );
        }
    }

    fn resolve_expr(&mut self, expression: &mut Expr) {
        let scope = expression.scope.unwrap_or_else(|| self.table.global());
        match &mut expression.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Identifier(identifier) => {
                identifier.symbol = self.resolve_value(identifier, scope, &expression.token);
            }
            ExprKind::Assign { target, value } => {
                self.resolve_expr(value);
                target.symbol = self.resolve_target(target, scope, &expression.token);
            }
            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Relational { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::Call {
                callee,
                arguments,
                symbol,
            } => {
                self.resolve_expr(callee);
                for argument in arguments.iter_mut() {
                    self.resolve_expr(argument);
                }
                if let ExprKind::Identifier(Identifier {
                    symbol: Some(id), ..
                }) = &callee.kind
                {
                    if matches!(self.table.symbol(*id).kind, SymbolKind::Function(_)) {
                        *symbol = Some(*id);
                    }
                }
            }
        }
    }

    /// Resolves a name read as a value.
    fn resolve_value(
        &mut self,
        identifier: &Identifier,
        scope: ScopeId,
        token: &Token,
    ) -> Option<SymbolId> {
        let symbol = self.lookup(identifier, scope, token)?;
        if matches!(self.table.symbol(symbol).kind, SymbolKind::BuiltinType(_)) {
            report(
                self.diagnostics,
                semantic_error(
                    token,
                    format!("'{}' is a type, not a value.", identifier.name),
                ),
            );
            return None;
        }
        Some(symbol)
    }

    /// Resolves the target of an assignment, which must be a variable.
    fn resolve_target(
        &mut self,
        identifier: &Identifier,
        scope: ScopeId,
        token: &Token,
    ) -> Option<SymbolId> {
        let symbol = self.lookup(identifier, scope, token)?;
        let kind = match self.table.symbol(symbol).kind {
            SymbolKind::Variable => return Some(symbol),
            SymbolKind::Function(_) => "function",
            SymbolKind::BuiltinType(_) => "type",
        };
        report(
            self.diagnostics,
            semantic_error(
                token,
                format!("Cannot assign to {} '{}'.", kind, identifier.name),
            ),
        );
        None
    }

    fn lookup(&mut self, identifier: &Identifier, scope: ScopeId, token: &Token) -> Option<SymbolId> {
        let found = self.table.lookup(scope, &identifier.name);
        if found.is_none() {
            report(
                self.diagnostics,
                semantic_error(token, format!("Undefined symbol '{}'.", identifier.name)),
            );
        }
        found
    }
}
