//! Classification of a single argument substring into a typed [`Argument`].

use super::arguments::{split_arguments, split_key_value};
use super::parser::parse_transformations;
use crate::error::{SyntaxError, SyntaxResult};
use crate::models::{Argument, ArgumentIterator, ArgumentKey, ArgumentValue, Extraction};
use crate::value::Value;

/// Convert one argument, with its optional `key:` prefix.
///
/// | Form | Result |
/// |------|--------|
/// | `"text"` | string scalar, `\"` and `\\` unescaped |
/// | `$accessor` / `$accessor\|Chain` | extraction |
/// | `[a, b]` | nested positional list |
/// | `{"k": v}` | nested keyed list |
/// | `true`, `false`, `null`, empty | keyword scalars |
/// | `12`, `-3`, `1.5` | numbers |
pub fn convert_argument(raw: &str) -> SyntaxResult<Argument> {
    let raw = raw.trim();
    let (key, value) = split_key_value(raw);
    let key = key.map(|k| convert_key(&k)).transpose()?;
    Ok(Argument {
        key,
        value: convert_value(&value)?,
    })
}

fn convert_key(raw: &str) -> SyntaxResult<ArgumentKey> {
    match convert_value(raw) {
        Ok(ArgumentValue::Scalar(value)) => Ok(ArgumentKey::Scalar(value)),
        Ok(ArgumentValue::Extraction(extraction)) => Ok(ArgumentKey::Extraction(extraction)),
        Ok(ArgumentValue::List(_)) => Err(SyntaxError::InvalidArgument(raw.to_string())),
        // Bare words are allowed as keys: `{CA: "Composer"}`.
        Err(SyntaxError::InvalidArgument(_)) if is_bare_word(raw) => {
            Ok(ArgumentKey::Scalar(Value::String(raw.to_string())))
        }
        Err(err) => Err(err),
    }
}

fn is_bare_word(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn convert_value(raw: &str) -> SyntaxResult<ArgumentValue> {
    let raw = raw.trim();
    if raw.starts_with('"') {
        return convert_string(raw).map(|s| ArgumentValue::Scalar(Value::String(s)));
    }
    if let Some(expression) = raw.strip_prefix('$') {
        return convert_extraction(expression).map(ArgumentValue::Extraction);
    }
    if let Some(interior) = raw.strip_prefix('[') {
        let interior = interior.strip_suffix(']').ok_or_else(|| unclosed('[', raw))?;
        return convert_list(interior).map(ArgumentValue::List);
    }
    if let Some(interior) = raw.strip_prefix('{') {
        let interior = interior.strip_suffix('}').ok_or_else(|| unclosed('{', raw))?;
        return convert_list(interior).map(ArgumentValue::List);
    }
    convert_scalar(raw).map(ArgumentValue::Scalar)
}

fn unclosed(token: char, raw: &str) -> SyntaxError {
    SyntaxError::UnclosedToken {
        token,
        count: 1,
        input: raw.to_string(),
    }
}

fn convert_string(raw: &str) -> SyntaxResult<String> {
    let unclosed_string = || SyntaxError::UnclosedString {
        input: raw.to_string(),
    };
    let interior = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(unclosed_string)?;

    let mut out = String::with_capacity(interior.len());
    let mut chars = interior.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\')) => out.push(next),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            // The closing quote was itself escaped.
            None => return Err(unclosed_string()),
        }
    }
    Ok(out)
}

fn convert_extraction(expression: &str) -> SyntaxResult<Extraction> {
    match find_top_level_pipe(expression) {
        Some(index) => {
            let accessor = expression[..index].trim();
            let chain = parse_transformations(&expression[index + 1..])?;
            Ok(Extraction::with_transformations(accessor, Some(chain)))
        }
        None => Ok(Extraction::new(expression.trim())),
    }
}

fn find_top_level_pipe(expression: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    let mut depth: usize = 0;
    for (index, c) in expression.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => return Some(index),
            _ => {}
        }
    }
    None
}

fn convert_list(interior: &str) -> SyntaxResult<ArgumentIterator> {
    split_arguments(interior)?
        .iter()
        .map(|piece| convert_argument(piece))
        .collect()
}

fn convert_scalar(raw: &str) -> SyntaxResult<Value> {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "false" => return Ok(Value::Bool(false)),
        "true" => return Ok(Value::Bool(true)),
        "" | "null" => return Ok(Value::Null),
        _ => {}
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(Value::Int(n));
        }
    }
    if is_numeric(raw) {
        if let Ok(n) = raw.parse::<f64>() {
            return Ok(Value::Float(n));
        }
    }
    Err(SyntaxError::InvalidArgument(raw.to_string()))
}

/// Decimal notation only, so `inf` and `NaN` stay invalid.
fn is_numeric(raw: &str) -> bool {
    raw.chars().any(|c| c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}
