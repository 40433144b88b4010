//! Recursive-descent parser producing the program syntax tree.
//!
//! Errors are recorded into [`Diagnostics`] and never abort the whole parse
//! unless they are fatal. Each expectation picks an [`ErrorMode`] deciding
//! how parsing continues after a mismatch.

mod expressions;
mod statements;

use crate::ast::{Stmt, StmtKind};
use crate::error::{Diagnostic, Diagnostics, ErrorCategory};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Maximum number of arguments in a call and parameters in a function.
pub const MAX_ARGUMENTS: usize = 255;

/// How the parser continues after an expected token is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Record the error and stop parsing altogether.
    Fatal,
    /// Record the error, unwind to the enclosing statement, and synchronise.
    Panic,
    /// Record the error and keep parsing from the current token.
    NonPanic,
    /// Record the error and act as if the expected token had been present.
    Repair,
}

/// Unwinding signal. The diagnostic itself is already recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub fatal: bool,
}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    lexer: Lexer,
    current: Token,
    previous: Token,
    lookahead: Option<Token>,
    diagnostics: Diagnostics,
    halted: bool,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let mut diagnostics = Diagnostics::new();
        let current = loop {
            match lexer.next_token() {
                Ok(token) => break token,
                Err(diagnostic) => diagnostics.report(diagnostic),
            }
        };
        Parser {
            lexer,
            previous: current.clone(),
            current,
            lookahead: None,
            diagnostics,
            halted: false,
        }
    }

    /// Parses a program from an in-memory buffer.
    pub fn from_source(name: &str, source: &str) -> Self {
        Self::new(Lexer::new(name, source))
    }

    /// Consumes the entire token stream and returns the program root, a
    /// sequence node holding the top-level statements.
    pub fn parse(&mut self) -> Stmt {
        let start = self.current.clone();
        let statements = self.statement_list(TokenKind::Eof);
        log::debug!(
            "parsed {} top-level statements with {} errors",
            statements.len(),
            self.diagnostics.len()
        );
        Stmt::new(StmtKind::Sequence(statements), start)
    }

    /// True if any error was recorded, whatever its recovery mode.
    pub fn had_errors(&self) -> bool {
        self.diagnostics.had_errors()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Parses statements until `end` (not consumed) or end of input. Each
    /// statement is a recovery boundary.
    pub(super) fn statement_list(&mut self, end: TokenKind) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.halted && !self.check(end) && !self.check(TokenKind::Eof) {
            match self.declaration() {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => {}
                Err(error) if error.fatal => {
                    self.halted = true;
                }
                Err(_) => self.synchronize(),
            }
        }
        statements
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consumes the current token if it has the given kind.
    pub(super) fn match_kind(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if !self.check(kind) {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    /// Moves to the next token. Lexical errors met on the way are recorded
    /// and reported as a panic so the caller unwinds to a statement boundary;
    /// the parser is left positioned on the next valid token.
    pub(super) fn advance(&mut self) -> ParseResult<()> {
        let mut failed = false;
        let next = match self.lookahead.take() {
            Some(token) => token,
            None => loop {
                match self.lexer.next_token() {
                    Ok(token) => break token,
                    Err(diagnostic) => {
                        self.diagnostics.report(diagnostic);
                        failed = true;
                    }
                }
            },
        };
        self.previous = std::mem::replace(&mut self.current, next);
        if failed {
            Err(ParseError { fatal: false })
        } else {
            Ok(())
        }
    }

    /// Returns the token after the current one without consuming anything.
    pub(super) fn peek_next(&mut self) -> Option<&Token> {
        if self.lookahead.is_none() {
            match self.lexer.next_token() {
                Ok(token) => self.lookahead = Some(token),
                Err(diagnostic) => {
                    self.diagnostics.report(diagnostic);
                    return None;
                }
            }
        }
        self.lookahead.as_ref()
    }

    /// Consumes a token of the expected kind, applying `mode` when it is
    /// missing.
    pub(super) fn expect(
        &mut self,
        kind: TokenKind,
        mode: ErrorMode,
        message: &str,
    ) -> ParseResult<Token> {
        if self.check(kind) {
            self.advance()?;
            return Ok(self.previous.clone());
        }

        let at = self.current.clone();
        self.error_at(&at, message);
        match mode {
            ErrorMode::Fatal => Err(ParseError { fatal: true }),
            ErrorMode::Panic => Err(ParseError { fatal: false }),
            ErrorMode::NonPanic => Ok(at),
            ErrorMode::Repair => Ok(Token::synthetic(kind, &at)),
        }
    }

    pub(super) fn error_at(&mut self, token: &Token, message: &str) {
        self.diagnostics.report(Diagnostic {
            category: ErrorCategory::Syntax,
            file: token.file.clone(),
            line: token.line,
            column: token.column,
            message: format!("at {}: {}", token, message),
        });
    }

    /// Records an error at the current token and unwinds.
    pub(super) fn fail(&mut self, message: &str) -> ParseError {
        let at = self.current.clone();
        self.error_at(&at, message);
        ParseError { fatal: false }
    }

    /// Skips tokens until a likely statement boundary: just past a semicolon
    /// or just before a statement-starting keyword.
    fn synchronize(&mut self) {
        while !self.check(TokenKind::Eof) {
            if self.current.kind.starts_statement() {
                return;
            }
            if self.current.kind == TokenKind::Semicolon {
                let _ = self.advance();
                return;
            }
            // Lexical errors met while skipping are already recorded.
            let _ = self.advance();
        }
    }
}
