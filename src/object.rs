use crate::bytecode::Chunk;
use crate::interner::ObjString;
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

/// Describes how a closure captures a variable: from the enclosing
/// function's locals (`is_local`) or from the enclosing closure's upvalues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpvalueDescriptor {
    pub is_local: bool,
    pub index: u8,
}

/// Where a captured variable currently lives.
#[derive(Debug, Clone, PartialEq)]
pub enum UpvalueState {
    /// Still on the VM stack at this absolute slot.
    Open(usize),
    /// Hoisted off the stack when its slot went out of scope.
    Closed(Value),
}

/// A live captured variable, shared by every closure that captured it.
///
/// Open upvalues form a singly linked list through `next`, sorted by
/// descending stack slot, so closing a range of slots only ever touches the
/// head of the list.
#[derive(Debug)]
pub struct Upvalue {
    pub state: UpvalueState,
    pub next: Option<UpvalueRef>,
}

impl Upvalue {
    pub fn new(slot: usize, next: Option<UpvalueRef>) -> Self {
        Upvalue {
            state: UpvalueState::Open(slot),
            next,
        }
    }

    /// The stack slot of an open upvalue.
    pub fn slot(&self) -> Option<usize> {
        match self.state {
            UpvalueState::Open(slot) => Some(slot),
            UpvalueState::Closed(_) => None,
        }
    }
}

pub type UpvalueRef = Rc<RefCell<Upvalue>>;

/// A compiled function: its bytecode and the shape of its call.
#[derive(Debug, Default)]
pub struct Function {
    /// `None` for the top-level script.
    pub name: Option<Rc<ObjString>>,
    pub arity: usize,
    pub upvalue_count: usize,
    pub chunk: Chunk,
}

impl Function {
    pub fn display_name(&self) -> &str {
        self.name.as_ref().map_or("script", |name| name.as_str())
    }
}

/// A function paired with the variables it captured.
#[derive(Debug)]
pub struct Closure {
    pub function: Rc<Function>,
    pub upvalues: Vec<UpvalueRef>,
}

impl Closure {
    pub fn new(function: Rc<Function>, upvalues: Vec<UpvalueRef>) -> Self {
        Closure { function, upvalues }
    }
}

/// Signature of builtins. The sink receives anything the builtin prints.
pub type NativeFn = fn(args: &[Value], out: &mut dyn Write) -> Result<Value, String>;

pub struct NativeFunction {
    pub name: Rc<ObjString>,
    /// Exact number of arguments, or `None` for variadic builtins.
    pub arity: Option<usize>,
    pub function: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name.as_str())
            .field("arity", &self.arity)
            .finish()
    }
}

/// Heap objects a [`Value`] can refer to. Objects are shared by reference
/// counting and never deep-copied.
#[derive(Debug, Clone)]
pub enum Obj {
    String(Rc<ObjString>),
    Function(Rc<Function>),
    Closure(Rc<Closure>),
    Native(Rc<NativeFunction>),
    Upvalue(UpvalueRef),
}

impl Obj {
    pub fn type_name(&self) -> &'static str {
        match self {
            Obj::String(_) => "string",
            Obj::Function(_) | Obj::Closure(_) | Obj::Native(_) => "function",
            Obj::Upvalue(_) => "upvalue",
        }
    }

    /// Reference identity.
    pub fn ptr_eq(&self, other: &Obj) -> bool {
        match (self, other) {
            (Obj::String(a), Obj::String(b)) => Rc::ptr_eq(a, b),
            (Obj::Function(a), Obj::Function(b)) => Rc::ptr_eq(a, b),
            (Obj::Closure(a), Obj::Closure(b)) => Rc::ptr_eq(a, b),
            (Obj::Native(a), Obj::Native(b)) => Rc::ptr_eq(a, b),
            (Obj::Upvalue(a), Obj::Upvalue(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn write_function(f: &mut fmt::Formatter, function: &Function) -> fmt::Result {
    match &function.name {
        Some(name) => write!(f, "<fn {}>", name),
        None => write!(f, "<script>"),
    }
}

impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Obj::String(string) => write!(f, "{}", string),
            Obj::Function(function) => write_function(f, function),
            Obj::Closure(closure) => write_function(f, &closure.function),
            Obj::Native(_) => write!(f, "<native fn>"),
            Obj::Upvalue(_) => write!(f, "upvalue"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::Interner;

    #[test]
    fn functions_display_their_name() {
        let mut interner = Interner::new();
        let named = Rc::new(Function {
            name: Some(interner.intern("add")),
            arity: 2,
            ..Function::default()
        });
        assert_eq!(Obj::Function(Rc::clone(&named)).to_string(), "<fn add>");
        let closure = Obj::Closure(Rc::new(Closure::new(named, Vec::new())));
        assert_eq!(closure.to_string(), "<fn add>");
        assert_eq!(Obj::Function(Rc::new(Function::default())).to_string(), "<script>");
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Obj::Function(Rc::new(Function::default()));
        let b = Obj::Function(Rc::new(Function::default()));
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
