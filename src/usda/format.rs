//! Literal formatting shared by the writer.
//!
//! Floats use Rust's shortest round-trip representation, so reparsing a
//! written value yields the same bits. Non-finite values are spelled the way
//! USD spells them: `inf`, `-inf`, `nan`.

use crate::core::is_identifier;
use crate::util::Value;

/// Format an `f64` so that parsing it back yields the same value.
pub fn fmt_f64(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        // Display gives `inf` / `-inf` and the shortest exact decimal
        format!("{v}")
    }
}

/// Format an `f32` so that parsing it back as `f32` yields the same value.
pub fn fmt_f32(v: f32) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{v}")
    }
}

/// Double-quoted string with escapes.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Dictionary key: bare when it is an identifier, quoted otherwise.
pub fn fmt_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn tuple<T: Copy>(items: &[T], f: impl Fn(T) -> String) -> String {
    let parts: Vec<String> = items.iter().map(|v| f(*v)).collect();
    format!("({})", parts.join(", "))
}

/// Format a typed value as a layer literal.
pub fn fmt_value(value: &Value) -> String {
    match value {
        Value::Bool(v) => (if *v { "1" } else { "0" }).to_string(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::Float(v) => fmt_f32(*v),
        Value::Double(v) => fmt_f64(*v),
        Value::Float2(v) => tuple(&v.to_array(), fmt_f32),
        Value::Float3(v) => tuple(&v.to_array(), fmt_f32),
        Value::Float4(v) => tuple(&v.to_array(), fmt_f32),
        Value::Double2(v) => tuple(&v.to_array(), fmt_f64),
        Value::Double3(v) => tuple(&v.to_array(), fmt_f64),
        Value::Double4(v) => tuple(&v.to_array(), fmt_f64),
        Value::Matrix4d(m) => {
            let rows: Vec<String> = m.to_cols_array_2d().iter().map(|row| tuple(row, fmt_f64)).collect();
            format!("( {} )", rows.join(", "))
        }
        Value::Token(s) | Value::String(s) => quote(s),
        Value::Asset(s) => format!("@{s}@"),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(fmt_value).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}
