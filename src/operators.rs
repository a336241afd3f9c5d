use crate::ast::node::{BinaryOperator, UnaryOperator};
use crate::error::RuntimeError;
use crate::value::{dict_get, Number, Value};
use std::cmp::Ordering;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, RuntimeError>;

fn unsupported(operator: BinaryOperator, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::UnsupportedOperands {
        operator: operator.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn overflow(operator: BinaryOperator) -> RuntimeError {
    RuntimeError::Overflow(operator.to_string())
}

/// Applies a binary operator to two evaluated operands.
pub(crate) fn binary(
    left: &Value,
    operator: BinaryOperator,
    right: &Value,
) -> Result<Value> {
    match operator {
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Multiply => multiply(left, right),
        BinaryOperator::Subtract
        | BinaryOperator::Divide
        | BinaryOperator::FloorDivide
        | BinaryOperator::Modulo
        | BinaryOperator::Power => {
            match (left.number(), right.number()) {
                (Some(a), Some(b)) => arithmetic(a, operator, b),
                _ => Err(unsupported(operator, left, right)),
            }
        }
        BinaryOperator::Equal => Ok(Value::Bool(left == right)),
        BinaryOperator::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => {
            let ordering = compare(left, right)
                .ok_or_else(|| unsupported(operator, left, right))?;

            let result = match operator {
                BinaryOperator::Less => ordering == Ordering::Less,
                BinaryOperator::LessEqual => ordering != Ordering::Greater,
                BinaryOperator::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };

            Ok(Value::Bool(result))
        }
        // Both operands are already evaluated; the deciding one is returned.
        BinaryOperator::And => Ok(if left.is_truthy() {
            right.clone()
        } else {
            left.clone()
        }),
        BinaryOperator::Or => Ok(if left.is_truthy() {
            left.clone()
        } else {
            right.clone()
        }),
        BinaryOperator::In => contains(right, left).map(Value::Bool),
        BinaryOperator::BitAnd
        | BinaryOperator::BitOr
        | BinaryOperator::BitXor
        | BinaryOperator::ShiftLeft
        | BinaryOperator::ShiftRight => bitwise(left, operator, right),
    }
}

/// Applies a unary operator to an evaluated operand.
pub(crate) fn unary(operator: UnaryOperator, operand: &Value) -> Result<Value> {
    let error = || RuntimeError::UnsupportedOperand {
        operator: operator.to_string(),
        operand: operand.type_name(),
    };

    match operator {
        UnaryOperator::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOperator::Plus => match operand.number().ok_or_else(error)? {
            Number::Int(i) => Ok(Value::Int(i)),
            Number::Float(f) => Ok(Value::Float(f)),
        },
        UnaryOperator::Minus => match operand.number().ok_or_else(error)? {
            Number::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::Overflow(operator.to_string())),
            Number::Float(f) => Ok(Value::Float(-f)),
        },
    }
}

fn add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
        (Value::List(a), Value::List(b)) => {
            let mut elements = a.borrow().clone();
            elements.extend(b.borrow().iter().cloned());
            Ok(Value::list(elements))
        }
        (Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::Tuple(a.iter().chain(b).cloned().collect()))
        }
        _ => match (left.number(), right.number()) {
            (Some(a), Some(b)) => arithmetic(a, BinaryOperator::Add, b),
            _ => Err(unsupported(BinaryOperator::Add, left, right)),
        },
    }
}

/// Longest string or list a repetition may produce.
const MAX_REPEAT_LENGTH: usize = 1 << 24;

fn repeat_count(length: usize, count: i64) -> Result<usize> {
    let count = usize::try_from(count).unwrap_or(0);

    match length.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LENGTH => Ok(count),
        _ => Err(overflow(BinaryOperator::Multiply)),
    }
}

fn multiply(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
            Ok(Value::Str(s.repeat(repeat_count(s.len(), *n)?)))
        }
        (Value::List(list), Value::Int(n))
        | (Value::Int(n), Value::List(list)) => {
            let list = list.borrow();
            let count = repeat_count(list.len(), *n)?;
            let mut elements = Vec::with_capacity(list.len() * count);

            for _ in 0..count {
                elements.extend(list.iter().cloned());
            }

            Ok(Value::list(elements))
        }
        _ => match (left.number(), right.number()) {
            (Some(a), Some(b)) => arithmetic(a, BinaryOperator::Multiply, b),
            _ => Err(unsupported(BinaryOperator::Multiply, left, right)),
        },
    }
}

fn arithmetic(left: Number, operator: BinaryOperator, right: Number) -> Result<Value> {
    match (left, right) {
        (Number::Int(a), Number::Int(b)) => integer_arithmetic(a, operator, b),
        (a, b) => float_arithmetic(a.as_f64(), operator, b.as_f64()),
    }
}

fn integer_arithmetic(a: i64, operator: BinaryOperator, b: i64) -> Result<Value> {
    let result = match operator {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => {
            return float_arithmetic(
                Number::Int(a).as_f64(),
                operator,
                Number::Int(b).as_f64(),
            )
        }
        BinaryOperator::FloorDivide => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }

            a.checked_div(b).map(|q| {
                if (a % b != 0) && ((a < 0) != (b < 0)) {
                    q - 1
                } else {
                    q
                }
            })
        }
        BinaryOperator::Modulo => {
            if b == 0 {
                return Err(RuntimeError::DivisionByZero);
            }

            if b == -1 {
                return Ok(Value::Int(0));
            }

            a.checked_rem(b).map(|r| {
                if r != 0 && ((r < 0) != (b < 0)) {
                    r + b
                } else {
                    r
                }
            })
        }
        BinaryOperator::Power => {
            if b < 0 {
                return float_arithmetic(
                    Number::Int(a).as_f64(),
                    operator,
                    Number::Int(b).as_f64(),
                );
            }

            u32::try_from(b).ok().and_then(|b| a.checked_pow(b))
        }
        _ => None,
    };

    result.map(Value::Int).ok_or_else(|| overflow(operator))
}

fn float_arithmetic(a: f64, operator: BinaryOperator, b: f64) -> Result<Value> {
    let result = match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide
        | BinaryOperator::FloorDivide
        | BinaryOperator::Modulo
            if b == 0.0 =>
        {
            return Err(RuntimeError::DivisionByZero)
        }
        BinaryOperator::Divide => a / b,
        BinaryOperator::FloorDivide => (a / b).floor(),
        BinaryOperator::Modulo => {
            let r = a % b;

            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        BinaryOperator::Power => {
            if a == 0.0 && b < 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }

            a.powf(b)
        }
        _ => return Err(overflow(operator)),
    };

    Ok(Value::Float(result))
}

/// Ordering for comparison operators. `None` if the operands can not be
/// ordered.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::List(a), Value::List(b)) => {
            compare_sequences(&a.borrow(), &b.borrow())
        }
        (Value::Tuple(a), Value::Tuple(b)) => compare_sequences(a, b),
        _ => left.number()?.compare(right.number()?),
    }
}

fn compare_sequences(left: &[Value], right: &[Value]) -> Option<Ordering> {
    for (a, b) in left.iter().zip(right) {
        if a != b {
            return compare(a, b);
        }
    }

    Some(left.len().cmp(&right.len()))
}

/// Membership test for `in`.
fn contains(container: &Value, item: &Value) -> Result<bool> {
    match container {
        Value::List(list) => Ok(list.borrow().iter().any(|e| e == item)),
        Value::Tuple(elements) => Ok(elements.iter().any(|e| e == item)),
        Value::Dict(pairs) => Ok(dict_get(&pairs.borrow(), item).is_some()),
        Value::Str(s) => match item {
            Value::Str(needle) => Ok(s.contains(needle.as_str())),
            other => Err(unsupported(BinaryOperator::In, other, container)),
        },
        other => Err(RuntimeError::NotIterable(other.type_name())),
    }
}

fn bitwise(left: &Value, operator: BinaryOperator, right: &Value) -> Result<Value> {
    let (a, b) = match (left.number(), right.number()) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => (a, b),
        _ => return Err(unsupported(operator, left, right)),
    };

    let result = match operator {
        BinaryOperator::BitAnd => a & b,
        BinaryOperator::BitOr => a | b,
        BinaryOperator::BitXor => a ^ b,
        BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight if b < 0 => {
            return Err(RuntimeError::NegativeShift)
        }
        BinaryOperator::ShiftLeft => {
            let shifted = u32::try_from(b)
                .ok()
                .and_then(|b| a.checked_shl(b))
                .ok_or_else(|| overflow(operator))?;

            // Bits shifted out of range mean the value does not fit.
            if shifted >> b != a {
                return Err(overflow(operator));
            }

            shifted
        }
        BinaryOperator::ShiftRight => {
            let shift = u32::try_from(b.min(63)).unwrap_or(63);
            a >> shift
        }
        _ => return Err(unsupported(operator, left, right)),
    };

    Ok(Value::Int(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};

    fn apply(left: Value, operator: BinaryOperator, right: Value) -> Value {
        match binary(&left, operator, &right) {
            Ok(value) => value,
            Err(err) => panic!("{} {} {} failed: {}", left, operator, right, err),
        }
    }

    #[test]
    fn operators_integer_division_test() {
        use BinaryOperator::{Divide, FloorDivide, Modulo};

        assert_eq!(apply(Value::Int(7), FloorDivide, Value::Int(2)), Value::Int(3));
        assert_eq!(apply(Value::Int(-7), FloorDivide, Value::Int(2)), Value::Int(-4));
        assert_eq!(apply(Value::Int(-7), Modulo, Value::Int(3)), Value::Int(2));
        assert_eq!(apply(Value::Int(7), Modulo, Value::Int(-3)), Value::Int(-2));
        assert_eq!(apply(Value::Int(7), Divide, Value::Int(2)), Value::Float(3.5));
        assert!(matches!(
            apply(Value::Int(4), Divide, Value::Int(2)),
            Value::Float(_)
        ));
    }

    #[test]
    fn operators_division_by_zero_test() -> Result<()> {
        for operator in [
            BinaryOperator::Divide,
            BinaryOperator::FloorDivide,
            BinaryOperator::Modulo,
        ] {
            match binary(&Value::Int(1), operator, &Value::Int(0)) {
                Err(RuntimeError::DivisionByZero) => (),
                other => bail!("Expected DivisionByZero, got {:?}", other),
            }
        }

        Ok(())
    }

    #[test]
    fn operators_overflow_test() -> Result<()> {
        match binary(&Value::Int(i64::MAX), BinaryOperator::Add, &Value::Int(1)) {
            Err(RuntimeError::Overflow(operator)) => assert_eq!(operator, "+"),
            other => bail!("Expected Overflow, got {:?}", other),
        }

        match binary(
            &Value::Int(i64::MIN),
            BinaryOperator::FloorDivide,
            &Value::Int(-1),
        ) {
            Err(RuntimeError::Overflow(operator)) => assert_eq!(operator, "//"),
            other => bail!("Expected Overflow, got {:?}", other),
        }

        match unary(UnaryOperator::Minus, &Value::Int(i64::MIN)) {
            Err(RuntimeError::Overflow(_)) => Ok(()),
            other => bail!("Expected Overflow, got {:?}", other),
        }
    }

    #[test]
    fn operators_modulo_minus_one_test() {
        assert_eq!(
            apply(Value::Int(i64::MIN), BinaryOperator::Modulo, Value::Int(-1)),
            Value::Int(0)
        );
        assert_eq!(
            apply(Value::Int(7), BinaryOperator::Modulo, Value::Int(-1)),
            Value::Int(0)
        );
    }

    #[test]
    fn operators_repetition_too_long_test() -> Result<()> {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);

        for (left, right) in [
            (Value::from("ab"), Value::Int(i64::MAX)),
            (Value::Int(i64::MAX), list.clone()),
            (list, Value::Int(1 << 30)),
        ] {
            match binary(&left, BinaryOperator::Multiply, &right) {
                Err(RuntimeError::Overflow(operator)) => assert_eq!(operator, "*"),
                other => bail!("Expected Overflow, got {:?}", other),
            }
        }

        assert_eq!(
            apply(Value::from("ab"), BinaryOperator::Multiply, Value::Int(-3)),
            Value::from("")
        );
        Ok(())
    }

    #[test]
    fn operators_mixed_types_test() -> Result<()> {
        assert_eq!(
            apply(Value::from("ab"), BinaryOperator::Multiply, Value::Int(2)),
            Value::from("abab")
        );
        assert_eq!(
            apply(Value::Int(1), BinaryOperator::Add, Value::Float(0.5)),
            Value::Float(1.5)
        );
        assert_eq!(
            apply(Value::Bool(true), BinaryOperator::Add, Value::Int(1)),
            Value::Int(2)
        );

        match binary(&Value::from("a"), BinaryOperator::Add, &Value::Int(1)) {
            Err(RuntimeError::UnsupportedOperands { left, right, .. }) => {
                assert_eq!(left, "str");
                assert_eq!(right, "int");
                Ok(())
            }
            other => bail!("Expected UnsupportedOperands, got {:?}", other),
        }
    }

    #[test]
    fn operators_logical_return_deciding_operand_test() {
        assert_eq!(
            apply(Value::Int(0), BinaryOperator::And, Value::Int(5)),
            Value::Int(0)
        );
        assert_eq!(
            apply(Value::Int(3), BinaryOperator::And, Value::Int(5)),
            Value::Int(5)
        );
        assert_eq!(
            apply(Value::None, BinaryOperator::Or, Value::from("x")),
            Value::from("x")
        );
    }

    #[test]
    fn operators_membership_and_comparison_test() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);

        assert_eq!(
            apply(Value::Int(2), BinaryOperator::In, list),
            Value::Bool(true)
        );
        assert_eq!(
            apply(Value::from("ell"), BinaryOperator::In, Value::from("hello")),
            Value::Bool(true)
        );
        assert_eq!(
            apply(Value::from("a"), BinaryOperator::Less, Value::from("b")),
            Value::Bool(true)
        );
        assert_eq!(
            apply(Value::Int(2), BinaryOperator::GreaterEqual, Value::Float(2.0)),
            Value::Bool(true)
        );
    }

    #[test]
    fn operators_bitwise_test() {
        assert_eq!(
            apply(Value::Int(1), BinaryOperator::ShiftLeft, Value::Int(4)),
            Value::Int(16)
        );
        assert_eq!(
            apply(Value::Int(-16), BinaryOperator::ShiftRight, Value::Int(100)),
            Value::Int(-1)
        );
        assert_eq!(
            apply(Value::Int(6), BinaryOperator::BitXor, Value::Int(3)),
            Value::Int(5)
        );
    }
}
