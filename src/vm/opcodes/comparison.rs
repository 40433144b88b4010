use crate::bytecode::OpCode;
use crate::error::RuntimeError;
use crate::value::Value;

/// Handle OpEqual / OpNotEqual. Values of different kinds are never equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    a == b
}

/// Handle the ordering opcodes, which only accept integers.
pub fn op_compare(op: OpCode, a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (a, b) = match (a, b) {
        (Value::Int(a), Value::Int(b)) => (*a, *b),
        _ => {
            return Err(RuntimeError::TypeMismatch(format!(
                "Operands of a comparison must be integers, found {} and {}.",
                a.type_name(),
                b.type_name()
            )))
        }
    };
    let result = match op {
        OpCode::OpGreater => a > b,
        OpCode::OpGreaterEqual => a >= b,
        OpCode::OpLess => a < b,
        OpCode::OpLessEqual => a <= b,
        other => {
            return Err(RuntimeError::MalformedBytecode(format!(
                "{:?} is not a comparison",
                other
            )))
        }
    };
    Ok(Value::Bool(result))
}
