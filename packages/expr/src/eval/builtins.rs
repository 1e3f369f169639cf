//! Built-in utility objects and intrinsic methods
//!
//! `Math` and `JSON` are ordinary objects of native functions that a host may
//! bind into a context. Strings, arrays and numbers carry a fixed set of
//! intrinsic methods resolved by name at call time. String indices are UTF-16
//! code units.

use once_cell::sync::Lazy;
use serde::Serialize;

use super::value::{join_values, number_to_string, Object, Value};
use crate::error::EvalError;

static UNDEFINED: Value = Value::Undefined;

/// Longest string a method may build, in UTF-16 code units
pub const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

static MATH: Lazy<Value> = Lazy::new(build_math);
static JSON: Lazy<Value> = Lazy::new(build_json);

/// The `Math` utility object
pub fn math() -> Value {
    MATH.clone()
}

/// The `JSON` utility object
pub fn json() -> Value {
    JSON.clone()
}

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&UNDEFINED)
}

fn unary(name: &'static str, op: fn(f64) -> f64) -> Value {
    Value::function(name, move |_, args| Ok(Value::Number(op(arg(args, 0).to_number()))))
}

fn build_math() -> Value {
    let mut map = Object::new();
    map.insert("PI".to_string(), Value::Number(std::f64::consts::PI));
    map.insert("E".to_string(), Value::Number(std::f64::consts::E));
    map.insert("abs".to_string(), unary("abs", f64::abs));
    map.insert("ceil".to_string(), unary("ceil", f64::ceil));
    map.insert("floor".to_string(), unary("floor", f64::floor));
    map.insert("round".to_string(), unary("round", js_round));
    map.insert("trunc".to_string(), unary("trunc", f64::trunc));
    map.insert("sign".to_string(), unary("sign", js_sign));
    map.insert("sqrt".to_string(), unary("sqrt", f64::sqrt));
    map.insert(
        "pow".to_string(),
        Value::function("pow", |_, args| {
            Ok(Value::Number(js_pow(
                arg(args, 0).to_number(),
                arg(args, 1).to_number(),
            )))
        }),
    );
    map.insert(
        "max".to_string(),
        Value::function("max", |_, args| {
            Ok(Value::Number(fold_numbers(args, f64::NEG_INFINITY, f64::max)))
        }),
    );
    map.insert(
        "min".to_string(),
        Value::function("min", |_, args| {
            Ok(Value::Number(fold_numbers(args, f64::INFINITY, f64::min)))
        }),
    );
    Value::object(map)
}

fn build_json() -> Value {
    let mut map = Object::new();
    map.insert(
        "stringify".to_string(),
        Value::function("stringify", |_, args| stringify(arg(args, 0), arg(args, 2))),
    );
    map.insert(
        "parse".to_string(),
        Value::function("parse", |_, args| {
            let text = arg(args, 0).to_js_string();
            serde_json::from_str::<serde_json::Value>(&text)
                .map(Value::from)
                .map_err(|err| EvalError::Json(err.to_string()))
        }),
    );
    Value::object(map)
}

fn js_round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn js_sign(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 {
        x
    } else {
        x.signum()
    }
}

fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

fn fold_numbers(args: &[Value], init: f64, op: fn(f64, f64) -> f64) -> f64 {
    let mut acc = init;
    for value in args {
        let n = value.to_number();
        if n.is_nan() {
            return f64::NAN;
        }
        acc = op(acc, n);
    }
    acc
}

/// `JSON.stringify(value, _, indent)`
fn stringify(value: &Value, indent: &Value) -> Result<Value, EvalError> {
    let Some(json) = value.to_json() else {
        return Ok(Value::Undefined);
    };
    let indent = match indent {
        Value::Number(n) if *n >= 1.0 => " ".repeat(n.min(10.0) as usize),
        Value::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    };

    if indent.is_empty() {
        return serde_json::to_string(&json)
            .map(Value::String)
            .map_err(|err| EvalError::Json(err.to_string()));
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    json.serialize(&mut serializer)
        .map_err(|err| EvalError::Json(err.to_string()))?;
    String::from_utf8(buf)
        .map(Value::String)
        .map_err(|err| EvalError::Json(err.to_string()))
}

/// Call an intrinsic method on a primitive or array receiver.
/// Returns `None` when the receiver type has no method of that name.
pub fn call_intrinsic(
    receiver: &Value,
    name: &str,
    args: &[Value],
) -> Option<Result<Value, EvalError>> {
    match receiver {
        Value::String(s) => string_method(s, name, args),
        Value::Array(items) => array_method(items, name, args),
        Value::Number(n) => number_method(*n, name, args),
        Value::Bool(b) if name == "toString" => Some(Ok(Value::String(b.to_string()))),
        _ => None,
    }
}

/// ToIntegerOrInfinity
fn to_integer(value: &Value) -> f64 {
    let n = value.to_number();
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

/// Resolve a possibly negative index against `len`, as `slice` does
fn relative_index(value: &Value, len: usize, default: usize) -> usize {
    if matches!(value, Value::Undefined) {
        return default;
    }
    let n = to_integer(value);
    let len_f = len as f64;
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}

fn clamp_index(value: &Value, len: usize, default: usize) -> usize {
    if matches!(value, Value::Undefined) {
        return default;
    }
    to_integer(value).clamp(0.0, len as f64) as usize
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

fn from_units(units: &[u16]) -> Value {
    Value::String(String::from_utf16_lossy(units))
}

fn invalid_length(function: &str) -> EvalError {
    EvalError::InvalidArgument {
        function: function.to_string(),
        message: "Invalid string length".to_string(),
    }
}

fn pad(s: &str, args: &[Value], at_start: bool) -> Result<Value, EvalError> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let target = to_integer(arg(args, 0));
    let filler: Vec<u16> = match arg(args, 1) {
        Value::Undefined => vec![u16::from(b' ')],
        other => other.to_js_string().encode_utf16().collect(),
    };
    if target <= units.len() as f64 || filler.is_empty() {
        return Ok(Value::String(s.to_string()));
    }
    if target > MAX_STRING_LENGTH as f64 {
        let function = if at_start {
            "String.prototype.padStart"
        } else {
            "String.prototype.padEnd"
        };
        return Err(invalid_length(function));
    }
    let target = target as usize;
    let padding: Vec<u16> = filler
        .iter()
        .copied()
        .cycle()
        .take(target - units.len())
        .collect();
    let joined = if at_start {
        [padding, units].concat()
    } else {
        [units, padding].concat()
    };
    Ok(from_units(&joined))
}

fn string_method(s: &str, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
    let units = || s.encode_utf16().collect::<Vec<u16>>();
    let search = || arg(args, 0).to_js_string();

    let value = match name {
        "toUpperCase" => Value::String(s.to_uppercase()),
        "toLowerCase" => Value::String(s.to_lowercase()),
        "trim" => Value::String(s.trim_matches(is_js_space).to_string()),
        "trimStart" => Value::String(s.trim_start_matches(is_js_space).to_string()),
        "trimEnd" => Value::String(s.trim_end_matches(is_js_space).to_string()),
        "toString" | "valueOf" => Value::String(s.to_string()),
        "charAt" => {
            let units = units();
            let index = to_integer(arg(args, 0));
            if index < 0.0 || index >= units.len() as f64 {
                Value::String(String::new())
            } else {
                let i = index as usize;
                from_units(&units[i..=i])
            }
        }
        "indexOf" => {
            let units = units();
            let needle: Vec<u16> = search().encode_utf16().collect();
            let from = clamp_index(arg(args, 1), units.len(), 0);
            Value::Number(find_units(&units, &needle, from).map_or(-1.0, |i| i as f64))
        }
        "includes" => Value::Bool(s.contains(search().as_str())),
        "startsWith" => Value::Bool(s.starts_with(search().as_str())),
        "endsWith" => Value::Bool(s.ends_with(search().as_str())),
        "substring" => {
            let units = units();
            let start = clamp_index(arg(args, 0), units.len(), 0);
            let end = clamp_index(arg(args, 1), units.len(), units.len());
            let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
            from_units(&units[lo..hi])
        }
        "slice" => {
            let units = units();
            let start = relative_index(arg(args, 0), units.len(), 0);
            let end = relative_index(arg(args, 1), units.len(), units.len());
            if start >= end {
                Value::String(String::new())
            } else {
                from_units(&units[start..end])
            }
        }
        "split" => {
            let limit = match arg(args, 1) {
                Value::Undefined => usize::MAX,
                other => other.to_number().max(0.0) as usize,
            };
            let parts: Vec<Value> = match arg(args, 0) {
                Value::Undefined => vec![Value::String(s.to_string())],
                separator => {
                    let separator = separator.to_js_string();
                    if separator.is_empty() {
                        s.chars().map(|ch| Value::String(ch.to_string())).collect()
                    } else {
                        s.split(separator.as_str()).map(Value::from).collect()
                    }
                }
            };
            Value::array(parts.into_iter().take(limit).collect())
        }
        "replace" => {
            let pattern = search();
            match s.find(pattern.as_str()) {
                None => Value::String(s.to_string()),
                Some(at) => {
                    let replacement = match arg(args, 1) {
                        Value::Function(func) => {
                            let offset = s[..at].encode_utf16().count() as f64;
                            let call_args = [
                                Value::String(pattern.clone()),
                                Value::Number(offset),
                                Value::String(s.to_string()),
                            ];
                            match func.call(&Value::Undefined, &call_args) {
                                Ok(value) => value.to_js_string(),
                                Err(err) => return Some(Err(err)),
                            }
                        }
                        other => other.to_js_string(),
                    };
                    let mut out = String::with_capacity(s.len() + replacement.len());
                    out.push_str(&s[..at]);
                    out.push_str(&replacement);
                    out.push_str(&s[at + pattern.len()..]);
                    Value::String(out)
                }
            }
        }
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                out.push_str(&value.to_js_string());
            }
            Value::String(out)
        }
        "padStart" => return Some(pad(s, args, true)),
        "padEnd" => return Some(pad(s, args, false)),
        "repeat" => {
            let count = to_integer(arg(args, 0));
            if count < 0.0 || count.is_infinite() {
                return Some(Err(EvalError::InvalidArgument {
                    function: "String.prototype.repeat".to_string(),
                    message: format!("Invalid count value: {}", number_to_string(count)),
                }));
            }
            let len = s.encode_utf16().count();
            if len == 0 {
                Value::String(String::new())
            } else if count * len as f64 > MAX_STRING_LENGTH as f64 {
                return Some(Err(invalid_length("String.prototype.repeat")));
            } else {
                Value::String(s.repeat(count as usize))
            }
        }
        _ => return None,
    };
    Some(Ok(value))
}

fn is_js_space(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{FEFF}'
}

fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a.strict_equals(b),
    }
}

fn array_method(items: &[Value], name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
    let value = match name {
        "join" => {
            let separator = match arg(args, 0) {
                Value::Undefined => ",".to_string(),
                other => other.to_js_string(),
            };
            Value::String(join_values(items, &separator))
        }
        "toString" => Value::String(join_values(items, ",")),
        "indexOf" => {
            let target = arg(args, 0);
            let from = relative_index(arg(args, 1), items.len(), 0);
            let found = items
                .iter()
                .enumerate()
                .skip(from)
                .find(|(_, item)| item.strict_equals(target));
            Value::Number(found.map_or(-1.0, |(i, _)| i as f64))
        }
        "includes" => {
            let target = arg(args, 0);
            Value::Bool(items.iter().any(|item| same_value_zero(item, target)))
        }
        "slice" => {
            let start = relative_index(arg(args, 0), items.len(), 0);
            let end = relative_index(arg(args, 1), items.len(), items.len());
            if start >= end {
                Value::array(Vec::new())
            } else {
                Value::array(items[start..end].to_vec())
            }
        }
        "concat" => {
            let mut out = items.to_vec();
            for value in args {
                match value {
                    Value::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Value::array(out)
        }
        _ => return None,
    };
    Some(Ok(value))
}

fn number_method(n: f64, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
    let result = match name {
        "toFixed" => to_fixed(n, arg(args, 0)),
        "toString" => match arg(args, 0) {
            Value::Undefined => Ok(Value::String(number_to_string(n))),
            radix => {
                let radix = to_integer(radix);
                if !(2.0..=36.0).contains(&radix) {
                    Err(EvalError::InvalidArgument {
                        function: "Number.prototype.toString".to_string(),
                        message: "toString() radix must be between 2 and 36".to_string(),
                    })
                } else {
                    Ok(Value::String(number_to_radix(n, radix as u32)))
                }
            }
        },
        "valueOf" => Ok(Value::Number(n)),
        _ => return None,
    };
    Some(result)
}

fn to_fixed(n: f64, digits: &Value) -> Result<Value, EvalError> {
    let digits = to_integer(digits);
    if !(0.0..=100.0).contains(&digits) {
        return Err(EvalError::InvalidArgument {
            function: "Number.prototype.toFixed".to_string(),
            message: "toFixed() digits argument must be between 0 and 100".to_string(),
        });
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(Value::String(number_to_string(n)));
    }
    let formatted = format!("{:.*}", digits as usize, n);
    // -0.00 prints as 0.00
    let formatted = match formatted.strip_prefix('-') {
        Some(rest) if rest.chars().all(|ch| ch == '0' || ch == '.') => rest.to_string(),
        _ => formatted,
    };
    Ok(Value::String(formatted))
}

fn number_to_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() {
        return number_to_string(n);
    }
    let base = f64::from(radix);
    let mut integer = n.abs().trunc();
    let mut fraction = n.abs().fract();

    let mut digits = Vec::new();
    if integer == 0.0 {
        digits.push('0');
    }
    while integer >= 1.0 {
        let digit = (integer % base) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        integer = (integer / base).trunc();
    }
    digits.reverse();

    let mut out: String = digits.into_iter().collect();
    if fraction > 0.0 {
        out.push('.');
        for _ in 0..20 {
            if fraction == 0.0 {
                break;
            }
            fraction *= base;
            let digit = fraction.trunc() as u32;
            out.push(std::char::from_digit(digit, radix).unwrap_or('0'));
            fraction -= f64::from(digit);
        }
    }
    if n < 0.0 {
        out.insert(0, '-');
    }
    out
}
