//! Error types shared by every phase of the pipeline.
//!
//! Front-end phases (lexer, parser, semantic passes, compiler) never abort on
//! the first problem. They record [`Diagnostic`]s into a [`Diagnostics`] sink
//! and the driver checks [`Diagnostics::had_errors`] between phases. The VM
//! stops at the first [`RuntimeError`].

use std::fmt;
use std::io;
use std::rc::Rc;

/// Broad classification of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Semantic,
    Compile,
    Runtime,
}

impl ErrorCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCategory::Lexical => "LexicalError",
            ErrorCategory::Syntax => "SyntaxError",
            ErrorCategory::Semantic => "SemanticError",
            ErrorCategory::Compile => "CompileError",
            ErrorCategory::Runtime => "RuntimeError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One reported front-end problem with its source location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{file}:{line}:{column}] {category}: {message}")]
pub struct Diagnostic {
    pub category: ErrorCategory,
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Accumulates diagnostics across a phase. This is the side channel every
/// front-end phase reports through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn had_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Returns true if any recorded diagnostic has the given category.
    pub fn has_category(&self, category: ErrorCategory) -> bool {
        self.entries.iter().any(|d| d.category == category)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, diagnostic) in self.entries.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Errors raised while executing bytecode.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Undefined variable '{0}'.")]
    UndefinedGlobal(String),
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch { expected: usize, got: usize },
    #[error("Can only call functions, not {0}.")]
    NotCallable(String),
    #[error("Stack overflow.")]
    StackOverflow,
    #[error("Stack underflow.")]
    StackUnderflow,
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("Integer overflow.")]
    IntegerOverflow,
    #[error("Native function '{name}' failed: {message}")]
    Native { name: String, message: String },
    #[error("Malformed bytecode: {0}")]
    MalformedBytecode(String),
}

/// A runtime error together with the call stack active when it was raised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{category}: {error}")]
pub struct RuntimeFailure {
    pub category: ErrorCategory,
    #[source]
    pub error: RuntimeError,
    /// `[line N] in name()` entries, innermost frame first.
    pub trace: Vec<String>,
}

impl RuntimeFailure {
    pub fn new(error: RuntimeError, trace: Vec<String>) -> Self {
        RuntimeFailure {
            category: ErrorCategory::Runtime,
            error,
            trace,
        }
    }
}

/// Top-level error returned by the pipeline driver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Diagnostics(Diagnostics),
    #[error(transparent)]
    Runtime(#[from] RuntimeFailure),
}

impl From<Diagnostics> for Error {
    fn from(diagnostics: Diagnostics) -> Self {
        Error::Diagnostics(diagnostics)
    }
}
