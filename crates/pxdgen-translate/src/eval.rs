//! Constant-expression evaluation for enumerator initializers.
//!
//! Only the subset of C constant expressions that shows up in practice for
//! enum values is supported: literals, unary `+ - ~`, and the shifts. Every
//! other shape is an error; the evaluator never guesses a value.

use std::fmt;

use pxdgen_core::tree::{BinaryOp, ConstExpr, UnaryOp};

use crate::error::EvalError;

/// A concrete value produced by [`evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

impl ConstValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstValue::Int(_) => "integer",
            ConstValue::Float(_) => "floating",
            ConstValue::Char(_) => "character",
            ConstValue::Str(_) => "string",
        }
    }

    /// The value as an integer, if it is integral (`Int` or `Char`).
    pub fn as_integral(&self) -> Result<i64, EvalError> {
        match self {
            ConstValue::Int(v) => Ok(*v),
            ConstValue::Char(c) => Ok(*c as i64),
            other => Err(EvalError::NotIntegral {
                found: other.kind_name(),
            }),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::Char(c) => write!(f, "{c:?}"),
            ConstValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// Evaluate a constant expression.
pub fn evaluate(expr: &ConstExpr) -> Result<ConstValue, EvalError> {
    match expr {
        ConstExpr::Int { text } => parse_int(text).map(ConstValue::Int),
        ConstExpr::Float { text } => parse_float(text).map(ConstValue::Float),
        ConstExpr::Char { text } => parse_char(text).map(ConstValue::Char),
        ConstExpr::String { text } => parse_string(text).map(ConstValue::Str),
        ConstExpr::Unary { op, operand } => apply_unary(*op, evaluate(operand)?),
        ConstExpr::Binary { op, lhs, rhs } => match op {
            BinaryOp::Shl | BinaryOp::Shr => {
                let lhs = integral_operand(*op, evaluate(lhs)?)?;
                let rhs = integral_operand(*op, evaluate(rhs)?)?;
                shift(*op, lhs, rhs).map(ConstValue::Int)
            }
            other => Err(EvalError::UnsupportedExpression {
                expr: format!("binary `{other}`"),
            }),
        },
        ConstExpr::Identifier { name } => Err(EvalError::UnsupportedExpression {
            expr: format!("identifier `{name}`"),
        }),
        ConstExpr::Unsupported { text } => Err(EvalError::UnsupportedExpression {
            expr: text.clone(),
        }),
    }
}

/// Evaluate an expression that must produce an integral value.
pub fn evaluate_integral(expr: &ConstExpr) -> Result<i64, EvalError> {
    evaluate(expr)?.as_integral()
}

fn apply_unary(op: UnaryOp, value: ConstValue) -> Result<ConstValue, EvalError> {
    let mismatch = |value: &ConstValue| EvalError::TypeMismatch {
        op: op.to_string(),
        operand: value.kind_name(),
    };
    match (op, value) {
        (UnaryOp::Plus, ConstValue::Int(v)) => Ok(ConstValue::Int(v)),
        (UnaryOp::Plus, ConstValue::Float(v)) => Ok(ConstValue::Float(v)),
        (UnaryOp::Plus, ConstValue::Char(c)) => Ok(ConstValue::Int(c as i64)),
        (UnaryOp::Minus, ConstValue::Int(v)) => Ok(ConstValue::Int(v.wrapping_neg())),
        (UnaryOp::Minus, ConstValue::Float(v)) => Ok(ConstValue::Float(-v)),
        (UnaryOp::Minus, ConstValue::Char(c)) => Ok(ConstValue::Int(-(c as i64))),
        (UnaryOp::BitNot, ConstValue::Int(v)) => Ok(ConstValue::Int(!v)),
        (UnaryOp::BitNot, ConstValue::Char(c)) => Ok(ConstValue::Int(!(c as i64))),
        (UnaryOp::Not, _) => Err(EvalError::UnsupportedExpression {
            expr: "unary `!`".to_string(),
        }),
        (_, value) => Err(mismatch(&value)),
    }
}

fn integral_operand(op: BinaryOp, value: ConstValue) -> Result<i64, EvalError> {
    value.as_integral().map_err(|_| EvalError::TypeMismatch {
        op: op.to_string(),
        operand: value.kind_name(),
    })
}

fn shift(op: BinaryOp, lhs: i64, count: i64) -> Result<i64, EvalError> {
    if !(0..64).contains(&count) {
        return Err(EvalError::ShiftOutOfRange { count });
    }
    let count = count as u32;
    Ok(match op {
        BinaryOp::Shl => lhs.wrapping_shl(count),
        // arithmetic shift on i64
        _ => lhs >> count,
    })
}

fn invalid(text: &str) -> EvalError {
    EvalError::InvalidLiteral {
        text: text.to_string(),
    }
}

/// Parse a C integer literal: decimal, `0x` hex, or leading-zero octal, with
/// any `u`/`l` suffix. Values wrap into `i64`.
fn parse_int(text: &str) -> Result<i64, EvalError> {
    let trimmed = text.trim();
    let (negative, unsigned_part) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let body = unsigned_part.trim_end_matches(['u', 'U', 'l', 'L']);
    let (digits, radix) = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (hex, 16)
    } else if body.len() > 1 && body.starts_with('0') {
        (&body[1..], 8)
    } else {
        (body, 10)
    };
    if digits.is_empty() {
        return Err(invalid(text));
    }
    let value = u64::from_str_radix(digits, radix).map_err(|_| invalid(text))? as i64;
    Ok(if negative { value.wrapping_neg() } else { value })
}

fn parse_float(text: &str) -> Result<f64, EvalError> {
    let body = text.trim().trim_end_matches(['f', 'F', 'l', 'L']);
    body.parse::<f64>().map_err(|_| invalid(text))
}

/// Strip an optional encoding prefix (`L`, `u`, `U`, `u8`) and the quotes.
fn strip_quotes(text: &str, quote: char) -> Option<&str> {
    let text = text.trim();
    let text = text
        .strip_prefix("u8")
        .or_else(|| text.strip_prefix(['L', 'u', 'U']))
        .unwrap_or(text);
    text.strip_prefix(quote)?.strip_suffix(quote)
}

fn parse_char(text: &str) -> Result<char, EvalError> {
    let inner = strip_quotes(text, '\'').ok_or_else(|| invalid(text))?;
    let decoded = unescape(inner).ok_or_else(|| invalid(text))?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(invalid(text)),
    }
}

fn parse_string(text: &str) -> Result<String, EvalError> {
    let inner = strip_quotes(text, '"').ok_or_else(|| invalid(text))?;
    unescape(inner).ok_or_else(|| invalid(text))
}

/// Decode C escape sequences. Returns `None` on a malformed escape.
fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'v' => '\u{0b}',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '?' => '?',
            'x' => {
                let mut value = 0u32;
                let mut seen = 0;
                while let Some(d) = chars.peek().and_then(|d| d.to_digit(16)) {
                    value = value.checked_mul(16)?.checked_add(d)?;
                    chars.next();
                    seen += 1;
                }
                if seen == 0 {
                    return None;
                }
                char::from_u32(value)?
            }
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                char::from_u32(value)?
            }
            _ => return None,
        };
        out.push(escaped);
    }
    Some(out)
}
