//! Runs the whole pipeline: lex and parse, analyze, compile, execute.
//!
//! Each front-end phase reports into its own [`Diagnostics`]; the driver
//! stops at the first phase that recorded anything, so the compiler only
//! ever sees a tree that parsed and analyzed cleanly.

use crate::error::{Diagnostics, Error};
use crate::interner::Interner;
use crate::lexer::Lexer;
use crate::object::Function;
use crate::parser::Parser;
use crate::semantic::{self, SymbolTable};
use crate::vm::VM;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

/// Parses, analyzes, and compiles everything `lexer` yields.
pub fn compile_lexer(lexer: Lexer, interner: &mut Interner) -> Result<Rc<Function>, Diagnostics> {
    let mut parser = Parser::new(lexer);
    let mut program = parser.parse();
    if parser.had_errors() {
        return Err(parser.into_diagnostics());
    }

    let mut table = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();
    semantic::analyze(&mut program, &mut table, &mut diagnostics);
    if diagnostics.had_errors() {
        return Err(diagnostics);
    }

    crate::compiler::compile(&program, interner, Some(&table))
}

/// Compiles an in-memory program named `name`.
pub fn compile_source(
    name: &str,
    source: &str,
    interner: &mut Interner,
) -> Result<Rc<Function>, Diagnostics> {
    compile_lexer(Lexer::new(name, source), interner)
}

/// Compiles and runs `source`, writing program output to `out`.
pub fn run_source<W: Write>(name: &str, source: &str, out: W) -> Result<W, Error> {
    let mut interner = Interner::new();
    let script = compile_source(name, source, &mut interner)?;
    execute(script, &mut interner, out)
}

/// Compiles and runs the program stored at `path`.
pub fn run_file<W: Write>(path: &Path, out: W) -> Result<W, Error> {
    let lexer = Lexer::from_path(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut interner = Interner::new();
    let script = compile_lexer(lexer, &mut interner)?;
    execute(script, &mut interner, out)
}

fn execute<W: Write>(script: Rc<Function>, interner: &mut Interner, out: W) -> Result<W, Error> {
    log::debug!("compiled {} bytes of top-level code", script.chunk.len());
    let mut vm = VM::new(interner, out);
    vm.interpret(script)?;
    Ok(vm.into_output())
}
