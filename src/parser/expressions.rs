//! Expression productions, lowest to highest binding:
//! assignment, `||`, `&&`, equality/relational, additive, multiplicative,
//! unary, call, primary.

use crate::ast::{
    BinaryOp, Expr, ExprKind, Identifier, Literal, LogicalOp, RelationalOp, UnaryOp,
};
use crate::token::TokenKind;

use super::{ErrorMode, ParseError, ParseResult, MAX_ARGUMENTS};

impl super::Parser {
    pub(super) fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// The left-hand side is parsed as a full `||` expression and only then
    /// checked: assignment targets must be plain identifiers, so `(a) = 1`
    /// is rejected too.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let grouped = self.current.kind == TokenKind::LeftParen;
        let expression = self.logic_or()?;

        if !self.match_kind(TokenKind::Equal)? {
            return Ok(expression);
        }
        let equals = self.previous.clone();
        let value = self.assignment()?;

        match expression.kind {
            ExprKind::Identifier(target) if !grouped => Ok(Expr::new(
                ExprKind::Assign {
                    target,
                    value: Box::new(value),
                },
                expression.token,
            )),
            _ => {
                self.error_at(&equals, "Invalid assignment target.");
                Err(ParseError { fatal: false })
            }
        }
    }

    fn logic_or(&mut self) -> ParseResult<Expr> {
        let mut expression = self.logic_and()?;
        while self.match_kind(TokenKind::OrOr)? {
            let operator = self.previous.clone();
            let right = self.logic_and()?;
            expression = Expr::new(
                ExprKind::Logical {
                    op: LogicalOp::Or,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
                operator,
            );
        }
        Ok(expression)
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expression = self.equality()?;
        while self.match_kind(TokenKind::AndAnd)? {
            let operator = self.previous.clone();
            let right = self.equality()?;
            expression = Expr::new(
                ExprKind::Logical {
                    op: LogicalOp::And,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
                operator,
            );
        }
        Ok(expression)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expression = self.additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::EqualEqual => RelationalOp::Equal,
                TokenKind::BangEqual => RelationalOp::NotEqual,
                TokenKind::Less => RelationalOp::Less,
                TokenKind::LessEqual => RelationalOp::LessEqual,
                TokenKind::Greater => RelationalOp::Greater,
                TokenKind::GreaterEqual => RelationalOp::GreaterEqual,
                _ => break,
            };
            self.advance()?;
            let operator = self.previous.clone();
            let right = self.additive()?;
            expression = Expr::new(
                ExprKind::Relational {
                    op,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
                operator,
            );
        }
        Ok(expression)
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        let mut expression = self.multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance()?;
            let operator = self.previous.clone();
            let right = self.multiplicative()?;
            expression = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
                operator,
            );
        }
        Ok(expression)
    }

    fn multiplicative(&mut self) -> ParseResult<Expr> {
        let mut expression = self.unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance()?;
            let operator = self.previous.clone();
            let right = self.unary()?;
            expression = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(expression),
                    right: Box::new(right),
                },
                operator,
            );
        }
        Ok(expression)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.current.kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.call(),
        };
        self.advance()?;
        let operator = self.previous.clone();
        let operand = self.unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            operator,
        ))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expression = self.primary()?;
        while self.match_kind(TokenKind::LeftParen)? {
            let paren = self.previous.clone();
            let mut arguments = Vec::new();
            if !self.check(TokenKind::RightParen) {
                loop {
                    if arguments.len() >= MAX_ARGUMENTS {
                        let at = self.current.clone();
                        self.error_at(&at, "Can't have more than 255 arguments.");
                    }
                    arguments.push(self.expression()?);
                    if !self.match_kind(TokenKind::Comma)? {
                        break;
                    }
                }
            }
            self.expect(
                TokenKind::RightParen,
                ErrorMode::Panic,
                "Expected ')' after arguments.",
            )?;
            expression = Expr::new(
                ExprKind::Call {
                    callee: Box::new(expression),
                    arguments,
                    symbol: None,
                },
                paren,
            );
        }
        Ok(expression)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.current.clone();
        let kind = match token.kind {
            TokenKind::Integer => ExprKind::Literal(Literal::Integer(token.integer.unwrap_or(0))),
            TokenKind::String => ExprKind::Literal(Literal::String(token.lexeme.clone())),
            TokenKind::True => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::False => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Null => ExprKind::Literal(Literal::Null),
            TokenKind::Identifier | TokenKind::Print => {
                ExprKind::Identifier(Identifier::new(token.lexeme.clone()))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let expression = self.expression()?;
                self.expect(
                    TokenKind::RightParen,
                    ErrorMode::NonPanic,
                    "Expected ')' after expression.",
                )?;
                return Ok(expression);
            }
            _ => return Err(self.fail("Expected expression.")),
        };
        self.advance()?;
        Ok(Expr::new(kind, token))
    }
}
