//! Expression lowering.

use crate::ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, RelationalOp, UnaryOp};
use crate::bytecode::OpCode;
use crate::value::Value;

use super::types::MAX_PARAMETERS;

impl super::Compiler<'_> {
    pub(super) fn compile_expr(&mut self, expression: &Expr) {
        self.locate(&expression.token);
        match &expression.kind {
            ExprKind::Literal(literal) => self.compile_literal(literal),
            ExprKind::Identifier(identifier) => {
                let target = self.resolve_variable(identifier);
                self.emit_get_variable(&identifier.name, target);
            }
            ExprKind::Assign { target, value } => {
                self.compile_expr(value);
                self.locate(&expression.token);
                let storage = self.resolve_variable(target);
                self.emit_set_variable(&target.name, storage);
            }
            ExprKind::Binary { op, left, right } => {
                self.compile_expr(left);
                self.compile_expr(right);
                self.locate(&expression.token);
                self.emit_op(match op {
                    BinaryOp::Add => OpCode::OpAdd,
                    BinaryOp::Subtract => OpCode::OpSubtract,
                    BinaryOp::Multiply => OpCode::OpMultiply,
                    BinaryOp::Divide => OpCode::OpDivide,
                });
            }
            ExprKind::Relational { op, left, right } => {
                self.compile_expr(left);
                self.compile_expr(right);
                self.locate(&expression.token);
                self.emit_op(match op {
                    RelationalOp::Equal => OpCode::OpEqual,
                    RelationalOp::NotEqual => OpCode::OpNotEqual,
                    RelationalOp::Less => OpCode::OpLess,
                    RelationalOp::LessEqual => OpCode::OpLessEqual,
                    RelationalOp::Greater => OpCode::OpGreater,
                    RelationalOp::GreaterEqual => OpCode::OpGreaterEqual,
                });
            }
            ExprKind::Logical { op, left, right } => match op {
                LogicalOp::And => self.compile_and(left, right),
                LogicalOp::Or => self.compile_or(left, right),
            },
            ExprKind::Unary { op, operand } => {
                self.compile_expr(operand);
                self.locate(&expression.token);
                match op {
                    UnaryOp::Plus => {}
                    UnaryOp::Negate => self.emit_op(OpCode::OpNegate),
                    UnaryOp::Not => self.emit_op(OpCode::OpNot),
                }
            }
            ExprKind::Call {
                callee, arguments, ..
            } => {
                self.compile_expr(callee);
                for argument in arguments {
                    self.compile_expr(argument);
                }
                self.locate(&expression.token);
                if arguments.len() > MAX_PARAMETERS {
                    self.error(format!("Can't have more than {} arguments.", MAX_PARAMETERS));
                }
                self.emit_op_operand(OpCode::OpCall, arguments.len().min(MAX_PARAMETERS) as u8);
            }
        }
    }

    fn compile_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Integer(value) => self.emit_constant(Value::Int(*value)),
            Literal::String(text) => {
                let string = self.interner.intern(text);
                self.emit_constant(Value::string(string));
            }
            Literal::Bool(true) => self.emit_op(OpCode::OpTrue),
            Literal::Bool(false) => self.emit_op(OpCode::OpFalse),
            Literal::Null => self.emit_op(OpCode::OpNull),
        }
    }

    /// `left && right`: skips `right` when `left` is falsey, leaving `left`
    /// as the result.
    fn compile_and(&mut self, left: &Expr, right: &Expr) {
        self.compile_expr(left);
        let end_jump = self.emit_jump(OpCode::OpJumpIfFalse);
        self.emit_op(OpCode::OpPop);
        self.compile_expr(right);
        self.patch_jump(end_jump);
    }

    /// `left || right`: skips `right` when `left` is truthy.
    fn compile_or(&mut self, left: &Expr, right: &Expr) {
        self.compile_expr(left);
        let else_jump = self.emit_jump(OpCode::OpJumpIfFalse);
        let end_jump = self.emit_jump(OpCode::OpJump);
        self.patch_jump(else_jump);
        self.emit_op(OpCode::OpPop);
        self.compile_expr(right);
        self.patch_jump(end_jump);
    }
}
