//! Arithmetic on numbers.

use crisp_ir::BinaryOp;
use num_traits::{pow, ToPrimitive, Zero};

use crate::errors::{invalid, EvalResult};
use crate::value::{Value, MAX_EXPONENT};

/// Apply `op`. A placeholder operand makes the result a placeholder.
pub(super) fn apply(op: BinaryOp, left: Value, right: Value) -> EvalResult<Value> {
    let (l, r) = match (left, right) {
        (Value::Placeholder, _) | (_, Value::Placeholder) => return Ok(Value::Placeholder),
        (Value::Number(l), Value::Number(r)) => (l, r),
        (l, r) => {
            return Err(invalid(format!(
                "cannot apply `{op}` to {} and {}",
                l.type_name(),
                r.type_name()
            )))
        }
    };
    let n = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => {
            if r.is_zero() {
                return Err(invalid("division by zero"));
            }
            l / r
        }
        BinaryOp::Pow => {
            let exp = r
                .to_u32()
                .filter(|e| *e <= MAX_EXPONENT)
                .ok_or_else(|| {
                    invalid(format!("exponent {r} must be between 0 and {MAX_EXPONENT}"))
                })?;
            pow(l, exp as usize)
        }
    };
    Ok(Value::Number(n))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use num_bigint::BigInt;
    use pretty_assertions::assert_eq;

    fn n(v: i64) -> Value {
        Value::Number(BigInt::from(v))
    }

    #[test]
    fn test_integer_ops() {
        assert_eq!(apply(BinaryOp::Add, n(2), n(3)).unwrap(), n(5));
        assert_eq!(apply(BinaryOp::Sub, n(2), n(3)).unwrap(), n(-1));
        assert_eq!(apply(BinaryOp::Div, n(7), n(2)).unwrap(), n(3));
        assert_eq!(apply(BinaryOp::Div, n(-7), n(2)).unwrap(), n(-3));
        assert_eq!(
            apply(BinaryOp::Pow, n(10), n(18)).unwrap(),
            Value::Number(BigInt::from(10u64.pow(18)))
        );
    }

    #[test]
    fn test_errors() {
        assert!(apply(BinaryOp::Div, n(1), n(0)).is_err());
        assert!(apply(BinaryOp::Pow, n(2), n(-1)).is_err());
        assert!(apply(BinaryOp::Pow, n(2), n(i64::from(MAX_EXPONENT) + 1)).is_err());
        assert!(apply(BinaryOp::Add, n(1), Value::Bool(true)).is_err());
    }

    #[test]
    fn test_placeholder_propagates() {
        assert_eq!(
            apply(BinaryOp::Div, Value::Placeholder, n(0)).unwrap(),
            Value::Placeholder
        );
    }
}
