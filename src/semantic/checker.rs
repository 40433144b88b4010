//! Bottom-up type propagation and validation.
//!
//! Every expression gets its `ty` filled in, `None` standing for an
//! unconstrained value. An unconstrained operand adopts the type its
//! operator demands, so it never causes an error by itself. Variables
//! without a declared type are fixed to the first non-null type assigned to
//! them.

use crate::ast::{
    BinaryOp, Expr, ExprKind, Identifier, Literal, LogicalOp, RelationalOp, Stmt, StmtKind,
    UnaryOp, VarDecl,
};
use crate::error::Diagnostics;
use crate::token::Token;

use super::symbols::{SymbolId, SymbolKind, SymbolTable, Type};
use super::{report, semantic_error};

pub struct TypeChecker<'a> {
    table: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
    /// Declared return type of each enclosing function, innermost last.
    returns: Vec<Option<Type>>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(table: &'a mut SymbolTable, diagnostics: &'a mut Diagnostics) -> Self {
        TypeChecker {
            table,
            diagnostics,
            returns: Vec::new(),
        }
    }

    /// Checks top-level code in source order before the hoisted function
    /// bodies, so a global's own initializer fixes its type first.
    pub fn check_program(&mut self, program: &mut Stmt) {
        let StmtKind::Sequence(statements) = &mut program.kind else {
            self.check_stmt(program);
            return;
        };
        let (functions, others): (Vec<&mut Stmt>, Vec<&mut Stmt>) =
            statements.iter_mut().partition(|stmt| stmt.is_function());
        for statement in others.into_iter().chain(functions) {
            self.check_stmt(statement);
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Expression(expression) => {
                self.check_expr(expression);
            }
            StmtKind::Declaration(declaration) => self.check_declaration(declaration, &stmt.token),
            StmtKind::Function(function) => {
                let return_type = function
                    .name
                    .symbol
                    .and_then(|id| self.table.symbol(id).signature())
                    .and_then(|signature| signature.return_type);
                self.returns.push(return_type);
                for statement in function.body.iter_mut() {
                    self.check_stmt(statement);
                }
                self.returns.pop();
            }
            StmtKind::Return(value) => {
                let Some(value) = value else {
                    return;
                };
                let actual = self.check_expr(value);
                let expected = self.returns.last().copied().flatten();
                if let (Some(expected), Some(actual)) = (expected, actual) {
                    if !assignable(expected, actual) {
                        let message = format!(
                            "Cannot return {} from a function returning {}.",
                            actual, expected
                        );
                        self.error(&value.token, message);
                    }
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_expr(condition);
                self.check_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.check_expr(condition);
                self.check_stmt(body);
            }
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
                ..
            } => {
                for statement in initializer.iter_mut() {
                    self.check_stmt(statement);
                }
                if let Some(condition) = condition {
                    self.check_expr(condition);
                }
                if let Some(increment) = increment {
                    self.check_expr(increment);
                }
                self.check_stmt(body);
            }
            StmtKind::Block(statements) | StmtKind::Sequence(statements) => {
                for statement in statements.iter_mut() {
                    self.check_stmt(statement);
                }
            }
        }
    }

    fn check_declaration(&mut self, declaration: &mut VarDecl, token: &Token) {
        let Some(initializer) = &mut declaration.initializer else {
            return;
        };
        let value = self.check_expr(initializer);
        self.check_store(&declaration.name, value, token);
    }

    /// Validates storing a value of type `value` into the variable `target`,
    /// fixing the variable's type if it was unconstrained.
    fn check_store(&mut self, target: &Identifier, value: Option<Type>, token: &Token) {
        let (Some(symbol), Some(value)) = (target.symbol, value) else {
            return;
        };
        if value == Type::Null {
            return;
        }
        match self.table.symbol(symbol).ty {
            None => {
                self.table.refine_type(symbol, value);
                log::trace!("inferred '{}' as {}", target.name, value);
            }
            Some(expected) if expected != value => {
                let message = format!(
                    "Cannot assign {} to '{}' of type {}.",
                    value, target.name, expected
                );
                self.error(token, message);
            }
            Some(_) => {}
        }
    }

    fn check_expr(&mut self, expression: &mut Expr) -> Option<Type> {
        let ty = match &mut expression.kind {
            ExprKind::Literal(literal) => Some(match literal {
                Literal::Integer(_) => Type::Int,
                Literal::String(_) => Type::String,
                Literal::Bool(_) => Type::Bool,
                Literal::Null => Type::Null,
            }),
            ExprKind::Identifier(identifier) => identifier
                .symbol
                .and_then(|symbol| self.table.symbol(symbol).ty),
            ExprKind::Assign { target, value } => {
                let value_type = self.check_expr(value);
                self.check_store(target, value_type, &expression.token);
                value_type
            }
            ExprKind::Binary { op, left, right } => {
                let left_type = self.check_expr(left);
                let right_type = self.check_expr(right);
                let symbol = binary_symbol(*op);
                self.require(left_type, Type::Int, symbol, &expression.token);
                self.require(right_type, Type::Int, symbol, &expression.token);
                Some(Type::Int)
            }
            ExprKind::Logical { op, left, right } => {
                let left_type = self.check_expr(left);
                let right_type = self.check_expr(right);
                let symbol = match op {
                    LogicalOp::And => "&&",
                    LogicalOp::Or => "||",
                };
                self.require(left_type, Type::Bool, symbol, &expression.token);
                self.require(right_type, Type::Bool, symbol, &expression.token);
                Some(Type::Bool)
            }
            ExprKind::Relational { op, left, right } => {
                let left_type = self.check_expr(left);
                let right_type = self.check_expr(right);
                if op.is_ordering() {
                    let symbol = relational_symbol(*op);
                    self.require(left_type, Type::Int, symbol, &expression.token);
                    self.require(right_type, Type::Int, symbol, &expression.token);
                } else if let (Some(left_type), Some(right_type)) = (left_type, right_type) {
                    if left_type != right_type
                        && left_type != Type::Null
                        && right_type != Type::Null
                    {
                        let message = format!("Cannot compare {} with {}.", left_type, right_type);
                        self.error(&expression.token, message);
                    }
                }
                Some(Type::Bool)
            }
            ExprKind::Unary { op, operand } => {
                let operand_type = self.check_expr(operand);
                match op {
                    UnaryOp::Not => Some(Type::Bool),
                    UnaryOp::Plus | UnaryOp::Negate => {
                        let symbol = if *op == UnaryOp::Plus { "+" } else { "-" };
                        self.require(operand_type, Type::Int, symbol, &expression.token);
                        Some(Type::Int)
                    }
                }
            }
            ExprKind::Call {
                callee,
                arguments,
                symbol,
            } => {
                let callee_type = self.check_expr(callee);
                let argument_types: Vec<Option<Type>> = arguments
                    .iter_mut()
                    .map(|argument| self.check_expr(argument))
                    .collect();
                match symbol {
                    Some(function) => {
                        self.check_call(*function, arguments, &argument_types, &expression.token)
                    }
                    None => {
                        if let Some(callee_type) = callee_type {
                            if callee_type != Type::Function {
                                let message =
                                    format!("Can only call functions, found {}.", callee_type);
                                self.error(&expression.token, message);
                            }
                        }
                        None
                    }
                }
            }
        };
        expression.ty = ty;
        ty
    }

    fn check_call(
        &mut self,
        function: SymbolId,
        arguments: &[Expr],
        argument_types: &[Option<Type>],
        token: &Token,
    ) -> Option<Type> {
        let symbol = self.table.symbol(function);
        let SymbolKind::Function(signature) = &symbol.kind else {
            return None;
        };
        let return_type = signature.return_type;
        if signature.variadic {
            return return_type;
        }
        if signature.params.len() != arguments.len() {
            let message = format!(
                "Function '{}' expects {} arguments but got {}.",
                symbol.name,
                signature.params.len(),
                arguments.len()
            );
            self.error(token, message);
            return return_type;
        }

        let mismatches: Vec<(usize, Type, Type)> = signature
            .params
            .iter()
            .zip(argument_types)
            .enumerate()
            .filter_map(|(index, (param, argument))| {
                let expected = self.table.symbol(*param).ty?;
                let actual = (*argument)?;
                (!assignable(expected, actual)).then_some((index, expected, actual))
            })
            .collect();
        let name = symbol.name.clone();
        for (index, expected, actual) in mismatches {
            let message = format!(
                "Argument {} of '{}' expects {} but got {}.",
                index + 1,
                name,
                expected,
                actual
            );
            self.error(&arguments[index].token, message);
        }
        return_type
    }

    /// Reports an error if a constrained operand is not of type `expected`.
    fn require(&mut self, actual: Option<Type>, expected: Type, operator: &str, token: &Token) {
        if let Some(actual) = actual {
            if actual != expected {
                let message = format!(
                    "Operand of '{}' must be {}, found {}.",
                    operator, expected, actual
                );
                self.error(token, message);
            }
        }
    }

    fn error(&mut self, token: &Token, message: String) {
        report(self.diagnostics, semantic_error(token, message));
    }
}

/// `null` may be stored anywhere; otherwise types must match exactly.
fn assignable(expected: Type, actual: Type) -> bool {
    actual == Type::Null || actual == expected
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
    }
}

fn relational_symbol(op: RelationalOp) -> &'static str {
    match op {
        RelationalOp::Equal => "==",
        RelationalOp::NotEqual => "!=",
        RelationalOp::Less => "<",
        RelationalOp::LessEqual => "<=",
        RelationalOp::Greater => ">",
        RelationalOp::GreaterEqual => ">=",
    }
}
