use crate::ast::{Stmt, StmtKind};

/// Moves function definitions to the front of the program's top-level
/// sequence, keeping their relative order, so sibling functions can refer to
/// each other regardless of textual order. Nested sequences are left alone.
pub fn hoist_functions(program: &mut Stmt) {
    if let StmtKind::Sequence(statements) = &mut program.kind {
        let (functions, others): (Vec<Stmt>, Vec<Stmt>) =
            std::mem::take(statements).into_iter().partition(Stmt::is_function);
        log::trace!("hoisted {} function definitions", functions.len());
        statements.extend(functions);
        statements.extend(others);
    }
}
