//! # Operator registry
//!
//! The fixed table of named binary operators the data pipeline evaluates:
//! filters, inserts and transforms all reference operators by token. Every
//! operator is a pure, side-effect-free function over JSON values — numbers,
//! strings, booleans and arrays. There is no state.
//!
//! JSON numbers are compared and combined through f64, the way the template
//! evaluator of the original wire format did; non-finite results collapse to
//! JSON null since JSON cannot carry NaN or infinities.

use serde_json::Value;

use crate::error::ReportError;

/// A registered binary operator, parsed from its declared token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `+` — sum, or concatenation when either operand is a string.
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `**`
    Pow,
    /// `=` — returns the right operand.
    Set,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `===`
    Eq,
    /// `!==`
    Ne,
    /// `||` — first operand when truthy, else the second.
    Or,
    /// `&&` — second operand when the first is truthy, else the first.
    And,
    /// `|`
    BitOr,
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `inc` — containment in an array or string.
    Contains,
    /// `!inc`
    NotContains,
    /// `sbstr` — text between two delimiter strings.
    Substr,
}

impl Operator {
    /// Resolve a declared token. Fails with [`ReportError::UnknownOperator`]
    /// for anything outside the registry.
    pub fn parse(token: &str) -> Result<Self, ReportError> {
        let op = match token {
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            "%" => Operator::Rem,
            "**" => Operator::Pow,
            "=" => Operator::Set,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            "===" => Operator::Eq,
            "!==" => Operator::Ne,
            "||" => Operator::Or,
            "&&" => Operator::And,
            "|" => Operator::BitOr,
            "&" => Operator::BitAnd,
            "^" => Operator::BitXor,
            "<<" => Operator::Shl,
            ">>" => Operator::Shr,
            "inc" => Operator::Contains,
            "!inc" => Operator::NotContains,
            "sbstr" => Operator::Substr,
            other => return Err(ReportError::UnknownOperator(other.to_string())),
        };
        Ok(op)
    }

    /// Apply the operator to two JSON values, producing a new value.
    pub fn apply(&self, a: &Value, b: &Value) -> Result<Value, ReportError> {
        match self {
            Operator::Add => {
                if a.is_string() || b.is_string() {
                    Ok(Value::String(format!("{}{}", loose_string(a), loose_string(b))))
                } else {
                    Ok(number(as_f64(a) + as_f64(b)))
                }
            }
            Operator::Sub => Ok(number(as_f64(a) - as_f64(b))),
            Operator::Mul => Ok(number(as_f64(a) * as_f64(b))),
            Operator::Div => Ok(number(as_f64(a) / as_f64(b))),
            Operator::Rem => Ok(number(as_f64(a) % as_f64(b))),
            Operator::Pow => Ok(number(as_f64(a).powf(as_f64(b)))),
            Operator::Set => Ok(b.clone()),
            Operator::Gt => Ok(Value::Bool(compare(a, b, |o| o.is_gt()))),
            Operator::Lt => Ok(Value::Bool(compare(a, b, |o| o.is_lt()))),
            Operator::Ge => Ok(Value::Bool(compare(a, b, |o| o.is_ge()))),
            Operator::Le => Ok(Value::Bool(compare(a, b, |o| o.is_le()))),
            Operator::Eq => Ok(Value::Bool(values_equal(a, b))),
            Operator::Ne => Ok(Value::Bool(!values_equal(a, b))),
            Operator::Or => Ok(if is_truthy(a) { a.clone() } else { b.clone() }),
            Operator::And => Ok(if is_truthy(a) { b.clone() } else { a.clone() }),
            Operator::BitOr => Ok(number((as_i64(a) | as_i64(b)) as f64)),
            Operator::BitAnd => Ok(number((as_i64(a) & as_i64(b)) as f64)),
            Operator::BitXor => Ok(number((as_i64(a) ^ as_i64(b)) as f64)),
            Operator::Shl => Ok(number((as_i64(a) << (as_i64(b) as u32 & 63)) as f64)),
            Operator::Shr => Ok(number((as_i64(a) >> (as_i64(b) as u32 & 63)) as f64)),
            Operator::Contains => Ok(Value::Bool(contains(a, b)?)),
            Operator::NotContains => Ok(Value::Bool(!contains(a, b)?)),
            Operator::Substr => substr_between(a, b),
        }
    }
}

/// Coerce a JSON value to f64. Missing fields arrive as null and yield NaN,
/// which the arithmetic operators collapse to JSON null.
fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        _ => f64::NAN,
    }
}

fn as_i64(v: &Value) -> i64 {
    let f = as_f64(v);
    if f.is_finite() {
        f as i64
    } else {
        0
    }
}

/// Wrap an f64 as a JSON number; non-finite values become null.
fn number(x: f64) -> Value {
    serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
}

/// Ordered comparison: numeric when both sides are numbers, lexicographic
/// when both are strings, false otherwise.
fn compare(a: &Value, b: &Value, check: fn(std::cmp::Ordering) -> bool) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => as_f64(a)
            .partial_cmp(&as_f64(b))
            .is_some_and(check),
        (Value::String(sa), Value::String(sb)) => check(sa.cmp(sb)),
        _ => false,
    }
}

/// Strict equality, with numbers compared through f64 so `1` equals `1.0`.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => as_f64(a) == as_f64(b),
        _ => a == b,
    }
}

/// JS-style truthiness, used by filter predicates and `||`/`&&`.
pub(crate) fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a value for string concatenation.
fn loose_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn contains(a: &Value, b: &Value) -> Result<bool, ReportError> {
    match a {
        Value::Array(items) => Ok(items.iter().any(|item| values_equal(item, b))),
        Value::String(s) => match b {
            Value::String(needle) => Ok(s.contains(needle.as_str())),
            other => Ok(s.contains(&loose_string(other))),
        },
        other => Err(ReportError::MalformedSpec(format!(
            "`inc` expects an array or string container, got {other}"
        ))),
    }
}

/// Text between the first `open` delimiter and the `close` delimiter that
/// follows it, trimmed. Empty when either delimiter is absent.
fn substr_between(a: &Value, b: &Value) -> Result<Value, ReportError> {
    let text = a.as_str().ok_or_else(|| {
        ReportError::MalformedSpec("`sbstr` expects a string operand".to_string())
    })?;
    let delims = b
        .as_array()
        .filter(|arr| arr.len() == 2)
        .and_then(|arr| Some((arr[0].as_str()?, arr[1].as_str()?)))
        .ok_or_else(|| {
            ReportError::MalformedSpec(
                "`sbstr` requires an array of two delimiter strings".to_string(),
            )
        })?;

    let (open, close) = delims;
    let extracted = text
        .find(open)
        .map(|start| &text[start + open.len()..])
        .and_then(|rest| rest.find(close).map(|end| rest[..end].trim()))
        .unwrap_or("");
    Ok(Value::String(extracted.to_string()))
}
