//! Symbol table: an arena of lexical scopes and the symbols declared in them.

use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;

/// Index of a scope in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Index of a symbol in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

/// Static value types known to the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    String,
    Null,
    Function,
}

impl Type {
    pub fn name(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Bool => "bool",
            Type::String => "string",
            Type::Null => "null",
            Type::Function => "function",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parameters and result of a function symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<SymbolId>,
    pub return_type: Option<Type>,
    /// Accepts any number of arguments of any type (builtins only).
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// A builtin type name such as `int`.
    BuiltinType(Type),
    Variable,
    Function(Signature),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: Rc<str>,
    /// Declared or inferred type; `None` means unconstrained.
    pub ty: Option<Type>,
    pub kind: SymbolKind,
    /// Scope the symbol is registered in, once registered.
    pub scope: Option<ScopeId>,
}

impl Symbol {
    pub fn variable(name: Rc<str>, ty: Option<Type>) -> Self {
        Symbol {
            name,
            ty,
            kind: SymbolKind::Variable,
            scope: None,
        }
    }

    pub fn function(name: Rc<str>, signature: Signature) -> Self {
        Symbol {
            name,
            ty: Some(Type::Function),
            kind: SymbolKind::Function(signature),
            scope: None,
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        match &self.kind {
            SymbolKind::Function(signature) => Some(signature),
            _ => None,
        }
    }
}

/// One lexical scope: a back-reference to its parent and its symbols in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    index: FxHashMap<Rc<str>, SymbolId>,
    order: Vec<SymbolId>,
}

impl Scope {
    /// Symbols declared in this scope, in insertion order.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.order
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table whose global scope holds the builtin types and the
    /// `print` builtin.
    pub fn new() -> Self {
        let mut table = SymbolTable {
            scopes: vec![Scope::default()],
            symbols: Vec::new(),
        };
        let global = table.global();
        for ty in [Type::Int, Type::Bool, Type::String] {
            let symbol = Symbol {
                name: Rc::from(ty.name()),
                ty: Some(ty),
                kind: SymbolKind::BuiltinType(ty),
                scope: None,
            };
            let id = table.add_symbol(symbol);
            let _ = table.insert(global, id);
        }
        let print = Symbol::function(
            Rc::from("print"),
            Signature {
                params: Vec::new(),
                return_type: Some(Type::Null),
                variadic: true,
            },
        );
        let id = table.add_symbol(print);
        let _ = table.insert(global, id);
        table
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        ScopeId(self.scopes.len() - 1)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Adds a symbol to the arena without registering it in any scope.
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.push(symbol);
        SymbolId(self.symbols.len() - 1)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0]
    }

    /// Registers `symbol` under its name in `scope`. A name may be registered
    /// once per scope; on a clash the existing symbol is returned as the error.
    pub fn insert(&mut self, scope: ScopeId, symbol: SymbolId) -> Result<(), SymbolId> {
        let name = Rc::clone(&self.symbols[symbol.0].name);
        let entry = &mut self.scopes[scope.0];
        if let Some(existing) = entry.index.get(&name) {
            return Err(*existing);
        }
        entry.index.insert(name, symbol);
        entry.order.push(symbol);
        self.symbols[symbol.0].scope = Some(scope);
        Ok(())
    }

    /// Looks `name` up in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.0].index.get(name).copied()
    }

    /// Looks `name` up from `scope` outward to the global scope.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup_local(id, name) {
                return Some(symbol);
            }
            current = self.scopes[id.0].parent;
        }
        None
    }

    pub fn is_global_symbol(&self, id: SymbolId) -> bool {
        self.symbols[id.0].scope == Some(self.global())
    }

    /// Fixes an unconstrained variable's type. Returns false (and leaves the
    /// symbol unchanged) if the type was already set.
    pub fn refine_type(&mut self, id: SymbolId, ty: Type) -> bool {
        let symbol = &mut self.symbols[id.0];
        if symbol.ty.is_some() || symbol.kind != SymbolKind::Variable {
            return false;
        }
        symbol.ty = Some(ty);
        true
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward_and_respects_shadowing() {
        let mut table = SymbolTable::new();
        let global = table.global();
        let inner = table.push_scope(global);

        let outer_x = table.add_symbol(Symbol::variable(Rc::from("x"), Some(Type::Int)));
        table.insert(global, outer_x).unwrap();
        assert_eq!(table.lookup(inner, "x"), Some(outer_x));
        assert_eq!(table.lookup_local(inner, "x"), None);

        let inner_x = table.add_symbol(Symbol::variable(Rc::from("x"), None));
        table.insert(inner, inner_x).unwrap();
        assert_eq!(table.lookup(inner, "x"), Some(inner_x));
        assert_eq!(table.lookup(global, "x"), Some(outer_x));
    }

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        let global = table.global();
        let first = table.add_symbol(Symbol::variable(Rc::from("a"), None));
        let second = table.add_symbol(Symbol::variable(Rc::from("a"), None));
        table.insert(global, first).unwrap();
        assert_eq!(table.insert(global, second), Err(first));
    }

    #[test]
    fn scope_keeps_insertion_order() {
        let mut table = SymbolTable::new();
        let scope = table.push_scope(table.global());
        let ids: Vec<SymbolId> = ["c", "a", "b"]
            .iter()
            .map(|name| {
                let id = table.add_symbol(Symbol::variable(Rc::from(*name), None));
                table.insert(scope, id).unwrap();
                id
            })
            .collect();
        assert_eq!(table.scope(scope).symbols(), ids.as_slice());
    }

    #[test]
    fn refine_type_is_one_shot() {
        let mut table = SymbolTable::new();
        let id = table.add_symbol(Symbol::variable(Rc::from("v"), None));
        assert!(table.refine_type(id, Type::Int));
        assert!(!table.refine_type(id, Type::Bool));
        assert_eq!(table.symbol(id).ty, Some(Type::Int));
    }

    #[test]
    fn builtins_live_in_global_scope() {
        let table = SymbolTable::new();
        let global = table.global();
        let int = table.lookup(global, "int").unwrap();
        assert_eq!(table.symbol(int).kind, SymbolKind::BuiltinType(Type::Int));
        let print = table.lookup(global, "print").unwrap();
        assert!(table.symbol(print).signature().unwrap().variadic);
    }
}
