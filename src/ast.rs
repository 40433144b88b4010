//! Syntax tree produced by the parser and annotated by semantic analysis.
//!
//! Every node exclusively owns its children. The `scope`, `symbol`, and `ty`
//! fields start empty and are filled in by the semantic passes; they are
//! indices into the [`SymbolTable`](crate::semantic::SymbolTable) arenas,
//! never owning references.

use crate::semantic::{ScopeId, SymbolId, Type};
use crate::token::Token;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    String(Rc<str>),
    Bool(bool),
    Null,
}

/// A name reference together with the symbol it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: Rc<str>,
    pub symbol: Option<SymbolId>,
}

impl Identifier {
    pub fn new(name: Rc<str>) -> Self {
        Identifier { name, symbol: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl RelationalOp {
    /// True for the ordering operators, which only accept integers.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, RelationalOp::Equal | RelationalOp::NotEqual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(Identifier),
    Assign {
        target: Identifier,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Relational {
        op: RelationalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        /// Function symbol the callee resolved to, when it names one.
        symbol: Option<SymbolId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Token used for error locations (operator, name, or literal).
    pub token: Token,
    pub scope: Option<ScopeId>,
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, token: Token) -> Self {
        Expr {
            kind,
            token,
            scope: None,
            ty: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Identifier,
    pub type_name: Option<Token>,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Identifier,
    pub type_name: Option<Token>,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Identifier,
    pub params: Vec<Param>,
    pub return_type: Option<Token>,
    pub body: Vec<Stmt>,
    /// Scope holding the parameters and the body's top-level declarations.
    pub body_scope: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    Declaration(VarDecl),
    Function(FunctionDecl),
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        initializer: Vec<Stmt>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
        /// Scope introduced by the loop header.
        header_scope: Option<ScopeId>,
    },
    /// Brace-delimited statements introducing a new lexical scope.
    Block(Vec<Stmt>),
    /// Statements sharing the enclosing scope (the program root, or a
    /// multi-declarator `var` statement).
    Sequence(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub token: Token,
    pub scope: Option<ScopeId>,
}

impl Stmt {
    pub fn new(kind: StmtKind, token: Token) -> Self {
        Stmt {
            kind,
            token,
            scope: None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, StmtKind::Function(_))
    }

    /// Statements of a sequence or block node; empty for other kinds.
    pub fn statements(&self) -> &[Stmt] {
        match &self.kind {
            StmtKind::Sequence(statements) | StmtKind::Block(statements) => statements,
            _ => &[],
        }
    }
}
