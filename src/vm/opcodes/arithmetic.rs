use crate::error::RuntimeError;
use crate::value::Value;

fn operands(a: &Value, b: &Value, operator: &str) -> Result<(i64, i64), RuntimeError> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::TypeMismatch(format!(
            "Operands of '{}' must be integers, found {} and {}.",
            operator,
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Handle OpAdd
pub fn op_add(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (a, b) = operands(a, b, "+")?;
    a.checked_add(b)
        .map(Value::Int)
        .ok_or(RuntimeError::IntegerOverflow)
}

/// Handle OpSubtract
pub fn op_subtract(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (a, b) = operands(a, b, "-")?;
    a.checked_sub(b)
        .map(Value::Int)
        .ok_or(RuntimeError::IntegerOverflow)
}

/// Handle OpMultiply
pub fn op_multiply(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (a, b) = operands(a, b, "*")?;
    a.checked_mul(b)
        .map(Value::Int)
        .ok_or(RuntimeError::IntegerOverflow)
}

/// Handle OpDivide. Integer division truncating toward zero.
pub fn op_divide(a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    let (a, b) = operands(a, b, "/")?;
    if b == 0 {
        return Err(RuntimeError::DivisionByZero);
    }
    a.checked_div(b)
        .map(Value::Int)
        .ok_or(RuntimeError::IntegerOverflow)
}

/// Handle OpNegate
pub fn op_negate(value: &Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Int(value) => value
            .checked_neg()
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow),
        other => Err(RuntimeError::TypeMismatch(format!(
            "Operand of '-' must be an integer, found {}.",
            other.type_name()
        ))),
    }
}

/// Handle OpNot. Any value is accepted; the result is its falsiness.
pub fn op_not(value: &Value) -> Value {
    Value::Bool(value.is_falsey())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic() {
        assert_eq!(op_add(&Value::Int(2), &Value::Int(3)), Ok(Value::Int(5)));
        assert_eq!(op_subtract(&Value::Int(2), &Value::Int(3)), Ok(Value::Int(-1)));
        assert_eq!(op_multiply(&Value::Int(4), &Value::Int(3)), Ok(Value::Int(12)));
        assert_eq!(op_divide(&Value::Int(-7), &Value::Int(2)), Ok(Value::Int(-3)));
        assert_eq!(op_negate(&Value::Int(4)), Ok(Value::Int(-4)));
    }

    #[test]
    fn non_integers_are_rejected() {
        let err = op_add(&Value::Int(1), &Value::Bool(true)).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch(_)));
        assert!(op_negate(&Value::Null).is_err());
    }

    #[test]
    fn division_by_zero_and_overflow() {
        assert_eq!(
            op_divide(&Value::Int(1), &Value::Int(0)),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            op_add(&Value::Int(i64::MAX), &Value::Int(1)),
            Err(RuntimeError::IntegerOverflow)
        );
    }

    #[test]
    fn not_uses_falsiness() {
        assert_eq!(op_not(&Value::Null), Value::Bool(true));
        assert_eq!(op_not(&Value::Int(0)), Value::Bool(false));
    }
}
