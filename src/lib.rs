pub mod ast;
pub mod bytecode;
pub mod cli;
pub mod compiler;
pub mod debug;
pub mod driver;
pub mod error;
pub mod interner;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod semantic;
pub mod table;
pub mod token;
pub mod value;
pub mod vm;

pub use driver::{compile_source, run_file, run_source};
pub use error::{Diagnostic, Diagnostics, Error, ErrorCategory, RuntimeError, RuntimeFailure};
pub use interner::Interner;
pub use value::Value;
pub use vm::VM;
