//! Operator semantics, shared by constant folding and evaluation.
//!
//! Integers and floats mix only when the integer side is a constant; the
//! result is then a float. Integer arithmetic is checked.

use crate::ast::{BinaryOp, UnaryOp};
use crate::types::Type;
use crate::value::Value;

/// Result type of `op` on an operand of type `ty`.
pub fn unary_type(op: UnaryOp, ty: &Type) -> Result<Type, String> {
    match (op, ty) {
        (UnaryOp::Neg, t) if t.is_numeric() => Ok(t.clone()),
        (UnaryOp::Not, Type::Bool) => Ok(Type::Bool),
        _ => Err(format!("invalid operation: operator {op} not defined on {ty}")),
    }
}

/// Result type of `lhs op rhs`. `*_const` says whether that side is a
/// constant, which lets an integer constant meet a float.
pub fn binary_type(
    op: BinaryOp,
    lhs: &Type,
    lhs_const: bool,
    rhs: &Type,
    rhs_const: bool,
) -> Result<Type, String> {
    let operand = match (lhs, rhs) {
        (a, b) if a == b => a.clone(),
        (Type::Int, Type::Float64) if lhs_const => Type::Float64,
        (Type::Float64, Type::Int) if rhs_const => Type::Float64,
        _ => {
            return Err(format!(
                "invalid operation: mismatched types {lhs} and {rhs}"
            ));
        },
    };

    let defined = if op.is_logical() {
        operand == Type::Bool
    } else if op.is_comparison() {
        match op {
            BinaryOp::Eq | BinaryOp::NotEq => matches!(
                operand,
                Type::Int | Type::Float64 | Type::String | Type::Bool | Type::Error
            ),
            _ => matches!(operand, Type::Int | Type::Float64 | Type::String),
        }
    } else {
        match op {
            BinaryOp::Add => matches!(operand, Type::Int | Type::Float64 | Type::String),
            BinaryOp::Rem => operand == Type::Int,
            _ => operand.is_numeric(),
        }
    };
    if !defined {
        return Err(format!(
            "invalid operation: operator {op} not defined on {operand}"
        ));
    }
    Ok(if op.is_comparison() {
        Type::Bool
    } else {
        operand
    })
}

pub fn unary(op: UnaryOp, value: &Value) -> Result<Value, String> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| "integer overflow".to_string()),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(format!(
            "operator {op} not defined on {}",
            value.type_of()
        )),
    }
}

pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, String> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b),
        (Value::Float(_) | Value::Int(_), Value::Float(_) | Value::Int(_)) => {
            match (lhs.as_float(), rhs.as_float()) {
                (Some(a), Some(b)) => float_op(op, a, b),
                _ => Err(mismatch(op, lhs, rhs)),
            }
        },
        (Value::Str(a), Value::Str(b)) => str_op(op, a, b),
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::And => Ok(Value::Bool(*a && *b)),
            BinaryOp::Or => Ok(Value::Bool(*a || *b)),
            BinaryOp::Eq => Ok(Value::Bool(a == b)),
            BinaryOp::NotEq => Ok(Value::Bool(a != b)),
            _ => Err(mismatch(op, lhs, rhs)),
        },
        (Value::Error(a), Value::Error(b)) => match op {
            BinaryOp::Eq => Ok(Value::Bool(a == b)),
            BinaryOp::NotEq => Ok(Value::Bool(a != b)),
            _ => Err(mismatch(op, lhs, rhs)),
        },
        _ => Err(mismatch(op, lhs, rhs)),
    }
}

/// Whether a value of type `from` may be converted to `to`.
pub fn convertible(from: &Type, to: &Type) -> bool {
    from == to || (from.is_numeric() && to.is_numeric())
}

/// Convert a value to a basic type. Floats truncate toward zero.
pub fn convert(value: &Value, to: &Type) -> Result<Value, String> {
    match (value, to) {
        (Value::Int(n), Type::Float64) => Ok(Value::Float(*n as f64)),
        (Value::Float(x), Type::Int) => {
            let truncated = x.trunc();
            if truncated.is_finite()
                && truncated >= i64::MIN as f64
                && truncated < i64::MAX as f64
            {
                Ok(Value::Int(truncated as i64))
            } else {
                Err(format!("cannot convert {} to int", value.plain()))
            }
        },
        (v, t) if v.type_of() == *t => Ok(v.clone()),
        (v, t) => Err(format!("cannot convert {} to {t}", v.type_of())),
    }
}

fn mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> String {
    format!(
        "operator {op} not defined on {} and {}",
        lhs.type_of(),
        rhs.type_of()
    )
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> Result<Value, String> {
    let overflow = || "integer overflow".to_string();
    let value = match op {
        BinaryOp::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
        BinaryOp::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
        BinaryOp::Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
        BinaryOp::Div | BinaryOp::Rem if b == 0 => {
            return Err("integer divide by zero".to_string());
        },
        BinaryOp::Div => Value::Int(a.checked_div(b).ok_or_else(overflow)?),
        BinaryOp::Rem => Value::Int(a.checked_rem(b).ok_or_else(overflow)?),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::And | BinaryOp::Or => {
            return Err(format!("operator {op} not defined on int"));
        },
    };
    Ok(value)
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> Result<Value, String> {
    let value = match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::Rem | BinaryOp::And | BinaryOp::Or => {
            return Err(format!("operator {op} not defined on float64"));
        },
    };
    Ok(value)
}

fn str_op(op: BinaryOp, a: &str, b: &str) -> Result<Value, String> {
    let value = match op {
        BinaryOp::Add => Value::Str(format!("{a}{b}")),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        _ => return Err(format!("operator {op} not defined on string")),
    };
    Ok(value)
}
