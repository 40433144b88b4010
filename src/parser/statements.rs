//! Statement productions.

use crate::ast::{
    Expr, ExprKind, FunctionDecl, Identifier, Param, Stmt, StmtKind, VarDecl,
};
use crate::error::ErrorCategory;
use crate::token::{Token, TokenKind};

use super::{ErrorMode, ParseError, ParseResult, MAX_ARGUMENTS};

impl super::Parser {
    /// Parses one statement. Returns `None` for an `include`, whose tokens are
    /// spliced into the stream rather than producing a node.
    pub(super) fn declaration(&mut self) -> ParseResult<Option<Stmt>> {
        let typed = self.current.kind == TokenKind::Identifier && self.typed_declaration_ahead();
        match self.current.kind {
            TokenKind::Var => {
                self.advance()?;
                let statement = self.var_declaration(None)?;
                self.expect(
                    TokenKind::Semicolon,
                    ErrorMode::Panic,
                    "Expected ';' after variable declaration.",
                )?;
                Ok(Some(statement))
            }
            TokenKind::Identifier if typed => {
                self.advance()?;
                let type_name = self.previous.clone();
                let statement = self.var_declaration(Some(type_name))?;
                self.expect(
                    TokenKind::Semicolon,
                    ErrorMode::Panic,
                    "Expected ';' after variable declaration.",
                )?;
                Ok(Some(statement))
            }
            TokenKind::Fun => self.function_declaration().map(Some),
            TokenKind::Include => {
                self.include_directive()?;
                Ok(None)
            }
            _ => self.statement().map(Some),
        }
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.current.kind {
            TokenKind::Return => self.return_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::LeftBrace => self.block(),
            TokenKind::Print => self.print_statement(),
            _ => self.expression_statement(),
        }
    }

    /// Two identifiers in a row start a typed declaration: `int x = 1;`.
    fn typed_declaration_ahead(&mut self) -> bool {
        matches!(self.peek_next(), Some(token) if token.kind == TokenKind::Identifier)
    }

    /// Parses `name (= init)? (, name (= init)?)*` after the `var` keyword or
    /// type name. More than one declarator yields a sequence node.
    fn var_declaration(&mut self, type_name: Option<Token>) -> ParseResult<Stmt> {
        let keyword = self.previous.clone();
        let mut declarations = Vec::new();
        loop {
            let name = self.expect(
                TokenKind::Identifier,
                ErrorMode::Panic,
                "Expected variable name.",
            )?;
            let initializer = if self.match_kind(TokenKind::Equal)? {
                Some(self.expression()?)
            } else {
                None
            };
            let declaration = VarDecl {
                name: Identifier::new(name.lexeme.clone()),
                type_name: type_name.clone(),
                initializer,
            };
            declarations.push(Stmt::new(StmtKind::Declaration(declaration), name));

            if !self.match_kind(TokenKind::Comma)? {
                break;
            }
        }

        if declarations.len() == 1 {
            Ok(declarations.remove(0))
        } else {
            Ok(Stmt::new(StmtKind::Sequence(declarations), keyword))
        }
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        self.advance()?; // Consume 'fun'
        let name = self.expect(
            TokenKind::Identifier,
            ErrorMode::Panic,
            "Expected function name.",
        )?;
        self.expect(
            TokenKind::LeftParen,
            ErrorMode::Panic,
            "Expected '(' after function name.",
        )?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let at = self.current.clone();
                    self.error_at(&at, "Can't have more than 255 parameters.");
                }
                params.push(self.parameter()?);
                if !self.match_kind(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(
            TokenKind::RightParen,
            ErrorMode::NonPanic,
            "Expected ')' after parameters.",
        )?;

        let return_type = if self.match_kind(TokenKind::Arrow)? {
            Some(self.expect(
                TokenKind::Identifier,
                ErrorMode::Panic,
                "Expected return type after '->'.",
            )?)
        } else {
            None
        };

        self.expect(
            TokenKind::LeftBrace,
            ErrorMode::Panic,
            "Expected '{' before function body.",
        )?;
        let body = self.block_body()?;

        let declaration = FunctionDecl {
            name: Identifier::new(name.lexeme.clone()),
            params,
            return_type,
            body,
            body_scope: None,
        };
        Ok(Stmt::new(StmtKind::Function(declaration), name))
    }

    fn parameter(&mut self) -> ParseResult<Param> {
        let first = self.expect(
            TokenKind::Identifier,
            ErrorMode::Panic,
            "Expected parameter name.",
        )?;
        if self.check(TokenKind::Identifier) {
            self.advance()?;
            let name = self.previous.clone();
            return Ok(Param {
                name: Identifier::new(name.lexeme.clone()),
                type_name: Some(first),
                token: name,
            });
        }
        Ok(Param {
            name: Identifier::new(first.lexeme.clone()),
            type_name: None,
            token: first,
        })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        self.advance()?; // Consume 'return'
        let keyword = self.previous.clone();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(
            TokenKind::Semicolon,
            ErrorMode::Panic,
            "Expected ';' after return value.",
        )?;
        Ok(Stmt::new(StmtKind::Return(value), keyword))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.advance()?; // Consume 'if'
        let keyword = self.previous.clone();
        self.expect(TokenKind::LeftParen, ErrorMode::Panic, "Expected '(' after 'if'.")?;
        let condition = self.expression()?;
        self.expect(
            TokenKind::RightParen,
            ErrorMode::NonPanic,
            "Expected ')' after condition.",
        )?;

        let then_branch = Box::new(self.statement()?);
        // An `else if` chain recurses through `statement`.
        let else_branch = if self.match_kind(TokenKind::Else)? {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            keyword,
        ))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.advance()?; // Consume 'while'
        let keyword = self.previous.clone();
        self.expect(
            TokenKind::LeftParen,
            ErrorMode::Panic,
            "Expected '(' after 'while'.",
        )?;
        let condition = self.expression()?;
        self.expect(
            TokenKind::RightParen,
            ErrorMode::NonPanic,
            "Expected ')' after condition.",
        )?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::new(StmtKind::While { condition, body }, keyword))
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.advance()?; // Consume 'for'
        let keyword = self.previous.clone();
        self.expect(TokenKind::LeftParen, ErrorMode::Panic, "Expected '(' after 'for'.")?;

        let initializer = self.for_initializer()?;
        self.expect(
            TokenKind::Semicolon,
            ErrorMode::Panic,
            "Expected ';' after loop initializer.",
        )?;

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(
            TokenKind::Semicolon,
            ErrorMode::Panic,
            "Expected ';' after loop condition.",
        )?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(
            TokenKind::RightParen,
            ErrorMode::NonPanic,
            "Expected ')' after for clauses.",
        )?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::new(
            StmtKind::For {
                initializer,
                condition,
                increment,
                body,
                header_scope: None,
            },
            keyword,
        ))
    }

    /// The initializer list of a `for` header: declarations or expressions,
    /// comma separated, possibly empty.
    fn for_initializer(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.check(TokenKind::Semicolon) {
            return Ok(Vec::new());
        }
        if self.match_kind(TokenKind::Var)? {
            return Ok(vec![self.var_declaration(None)?]);
        }
        if self.check(TokenKind::Identifier) && self.typed_declaration_ahead() {
            self.advance()?;
            let type_name = self.previous.clone();
            return Ok(vec![self.var_declaration(Some(type_name))?]);
        }

        let mut statements = Vec::new();
        loop {
            let expression = self.expression()?;
            let token = expression.token.clone();
            statements.push(Stmt::new(StmtKind::Expression(expression), token));
            if !self.match_kind(TokenKind::Comma)? {
                break;
            }
        }
        Ok(statements)
    }

    fn block(&mut self) -> ParseResult<Stmt> {
        self.advance()?; // Consume '{'
        let brace = self.previous.clone();
        let statements = self.block_body()?;
        Ok(Stmt::new(StmtKind::Block(statements), brace))
    }

    /// Parses statements up to the closing brace. A missing brace is repaired
    /// so the tree stays well formed.
    fn block_body(&mut self) -> ParseResult<Vec<Stmt>> {
        let statements = self.statement_list(TokenKind::RightBrace);
        if self.halted {
            return Err(ParseError { fatal: true });
        }
        self.expect(
            TokenKind::RightBrace,
            ErrorMode::Repair,
            "Expected '}' after block.",
        )?;
        Ok(statements)
    }

    /// `print a, b;` is a call of the `print` builtin.
    fn print_statement(&mut self) -> ParseResult<Stmt> {
        self.advance()?; // Consume 'print'
        let keyword = self.previous.clone();
        let mut arguments = Vec::new();
        if !self.check(TokenKind::Semicolon) {
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
            TokenKind::Semicolon,
            ErrorMode::Panic,
            "Expected ';' after print arguments.",
        )?;

        let callee = Expr::new(
            ExprKind::Identifier(Identifier::new(keyword.lexeme.clone())),
            keyword.clone(),
        );
        let call = Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                arguments,
                symbol: None,
            },
            keyword.clone(),
        );
        Ok(Stmt::new(StmtKind::Expression(call), keyword))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.expression()?;
        let token = expression.token.clone();
        self.expect(
            TokenKind::Semicolon,
            ErrorMode::Panic,
            "Expected ';' after expression.",
        )?;
        Ok(Stmt::new(StmtKind::Expression(expression), token))
    }

    /// `include "path";` redirects the lexer to the named file right after the
    /// semicolon. Any failure to open it stops the parse.
    fn include_directive(&mut self) -> ParseResult<()> {
        self.advance()?; // Consume 'include'
        let path = self.expect(
            TokenKind::String,
            ErrorMode::Panic,
            "Expected file path string after 'include'.",
        )?;
        if !self.check(TokenKind::Semicolon) {
            return Err(self.fail("Expected ';' after include path."));
        }
        // The lexer sits just past the semicolon, which is where the included
        // tokens must be spliced in.
        if let Err(mut diagnostic) = self.lexer.push_file(&path.lexeme, &path) {
            diagnostic.category = ErrorCategory::Syntax;
            self.diagnostics.report(diagnostic);
            return Err(ParseError { fatal: true });
        }
        self.advance()?; // Consume ';'
        Ok(())
    }
}
