//! Semantic analysis: a fixed sequence of passes over the parsed program.
//!
//! 1. [`hoist_functions`] moves top-level functions to the front.
//! 2. [`Definer`] binds nodes to scopes and creates declaration symbols.
//! 3. [`register_globals`] registers top-level declarations.
//! 4. [`Resolver`] registers locals in order and resolves every name.
//! 5. [`TypeChecker`] propagates types and validates operators, calls, and
//!    assignments.
//!
//! All passes run to completion; problems accumulate in [`Diagnostics`] and
//! the caller must check [`Diagnostics::had_errors`] before code generation.

mod checker;
mod definer;
mod hoist;
mod resolver;
mod symbols;

pub use checker::TypeChecker;
pub use definer::{register_globals, Definer};
pub use hoist::hoist_functions;
pub use resolver::Resolver;
pub use symbols::{Scope, ScopeId, Signature, Symbol, SymbolId, SymbolKind, SymbolTable, Type};

use crate::ast::Stmt;
use crate::error::{Diagnostic, Diagnostics, ErrorCategory};
use crate::token::Token;

/// Runs every pass over `program`, recording problems into `diagnostics`.
pub fn analyze(program: &mut Stmt, table: &mut SymbolTable, diagnostics: &mut Diagnostics) {
    hoist_functions(program);
    Definer::new(table, diagnostics).define_program(program);
    register_globals(program, table, diagnostics);
    Resolver::new(table, diagnostics).resolve_program(program);
    TypeChecker::new(table, diagnostics).check_program(program);
    log::debug!(
        "semantic analysis finished: {} scopes, {} errors",
        table.scope_count(),
        diagnostics.len()
    );
}

pub(crate) fn semantic_error(token: &Token, message: String) -> Diagnostic {
    Diagnostic {
        category: ErrorCategory::Semantic,
        file: token.file.clone(),
        line: token.line,
        column: token.column,
        message,
    }
}

pub(crate) fn report(diagnostics: &mut Diagnostics, diagnostic: Diagnostic) {
    diagnostics.report(diagnostic);
}
