use crate::interner::Interner;
use crate::object::{NativeFn, NativeFunction, Obj};
use crate::table::Table;
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;

/// Registers all builtin native functions into the globals table.
///
/// Currently this is only `print`.
pub fn register_builtins(globals: &mut Table, interner: &mut Interner) {
    define_native(globals, interner, "print", None, native_print);
}

fn define_native(
    globals: &mut Table,
    interner: &mut Interner,
    name: &str,
    arity: Option<usize>,
    function: NativeFn,
) {
    let name = interner.intern(name);
    let native = NativeFunction {
        name: Rc::clone(&name),
        arity,
        function,
    };
    globals.set(name, Value::Obj(Obj::Native(Rc::new(native))));
}

/// Writes its arguments separated by single spaces, then a newline.
/// Returns `null`.
pub fn native_print(args: &[Value], out: &mut dyn Write) -> Result<Value, String> {
    let line = args
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{}", line).map_err(|err| err.to_string())?;
    Ok(Value::Null)
}
