//! Bundled transformers.
//!
//! String transformers accept any scalar (numbers and booleans are used in
//! their string form) and let `null` pass through untouched. Unless stated
//! otherwise they broadcast over list payloads.
//!
//! | Name | Arguments | Effect |
//! |------|-----------|--------|
//! | `Trim` | `chars?` | strip whitespace (or the given characters) |
//! | `Uppercase` / `Lowercase` | - | change case |
//! | `Replace` | `pattern, replacement?` | regex replace, `/.../flags` accepted |
//! | `PadStart` / `PadEnd` | `length, char?` | pad to length (default `"0"`) |
//! | `ExtractYear` | - | first four-digit run as an integer |
//! | `EnsurePrefix` / `EnsureSuffix` | `value` | add if missing |
//! | `Prepend` / `Append` | `parts...` | add each part in turn |
//! | `Map` | `mapping, default?` | lookup table |
//! | `Split` | `separator?` | string to list (default `","`) |
//! | `Join` | `separator?` | list to string (whole list) |
//! | `ToBoolean` | `true_values...` | truthy strings to `true` |
//! | `ToNumber` | - | integer or float |
//! | `ToString` | - | scalar to string |
//! | `Substring` | `start, length?` | character slice |
//! | `Alphanumeric` / `DigitsOnly` | - | character filters |
//! | `DateFormat` | `output, input?` | reformat a date |
//! | `Default` | `value` | replace empty payloads (whole value) |
//! | `First` / `Last` / `Count` | - | list access (whole list) |

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write as _;
use std::sync::Arc;

use super::{compile_pattern, Arguments, Transformer};
use crate::error::TransformationError;
use crate::value::{Context, Value};

type Result<T> = std::result::Result<T, TransformationError>;

/// Every bundled transformer, for [`super::Registry::with_defaults`].
pub fn defaults() -> Vec<Arc<dyn Transformer>> {
    vec![
        Arc::new(Trim),
        Arc::new(Uppercase),
        Arc::new(Lowercase),
        Arc::new(Replace),
        Arc::new(PadStart),
        Arc::new(PadEnd),
        Arc::new(ExtractYear),
        Arc::new(EnsurePrefix),
        Arc::new(EnsureSuffix),
        Arc::new(Prepend),
        Arc::new(Append),
        Arc::new(Map),
        Arc::new(Split),
        Arc::new(Join),
        Arc::new(ToBoolean),
        Arc::new(ToNumber),
        Arc::new(ToString),
        Arc::new(Substring),
        Arc::new(Alphanumeric),
        Arc::new(DigitsOnly),
        Arc::new(DateFormat),
        Arc::new(Default),
        Arc::new(First),
        Arc::new(Last),
        Arc::new(Count),
    ]
}

// =============================================================================
// Helpers
// =============================================================================

/// String form of a scalar payload; `None` for null.
fn input_text(transformer: &'static str, payload: &Value) -> Result<Option<String>> {
    match payload {
        Value::Null => Ok(None),
        other => other.to_display_string().map(Some).ok_or_else(|| {
            TransformationError::invalid_input(
                transformer,
                format!("expected a scalar, got {}", other.type_name()),
            )
        }),
    }
}

fn map_text<F>(transformer: &'static str, payload: Value, f: F) -> Result<Value>
where
    F: FnOnce(String) -> Result<Value>,
{
    match input_text(transformer, &payload)? {
        Some(text) => f(text),
        None => Ok(Value::Null),
    }
}

fn string_arg(transformer: &'static str, arguments: &Arguments, index: usize, name: &str) -> Result<String> {
    optional_string_arg(transformer, arguments, index, name)?.ok_or_else(|| {
        TransformationError::invalid_argument(transformer, format!("missing argument '{}'", name))
    })
}

fn optional_string_arg(
    transformer: &'static str,
    arguments: &Arguments,
    index: usize,
    name: &str,
) -> Result<Option<String>> {
    match arguments.get_or_named(index, name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.to_display_string().map(Some).ok_or_else(|| {
            TransformationError::invalid_argument(
                transformer,
                format!("'{}' must be a scalar, got {}", name, value.type_name()),
            )
        }),
    }
}

fn optional_usize_arg(
    transformer: &'static str,
    arguments: &Arguments,
    index: usize,
    name: &str,
) -> Result<Option<usize>> {
    let invalid = |value: &Value| {
        TransformationError::invalid_argument(
            transformer,
            format!("'{}' must be a non-negative integer, got {}", name, value),
        )
    };
    match arguments.get_or_named(index, name) {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Int(n)) => usize::try_from(*n).map(Some).map_err(|_| invalid(value)),
        Some(value @ Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid(value)),
        Some(value) => Err(invalid(value)),
    }
}

fn usize_arg(transformer: &'static str, arguments: &Arguments, index: usize, name: &str) -> Result<usize> {
    optional_usize_arg(transformer, arguments, index, name)?.ok_or_else(|| {
        TransformationError::invalid_argument(transformer, format!("missing argument '{}'", name))
    })
}

/// Every positional argument as text, in order; `null` arguments are skipped.
fn text_parts(transformer: &'static str, arguments: &Arguments) -> Result<Vec<String>> {
    arguments
        .values()
        .filter(|value| !value.is_null())
        .map(|value| {
            value.to_display_string().ok_or_else(|| {
                TransformationError::invalid_argument(
                    transformer,
                    format!("expected scalar parts, got {}", value.type_name()),
                )
            })
        })
        .collect()
}

fn pad_char(transformer: &'static str, arguments: &Arguments) -> Result<char> {
    Ok(optional_string_arg(transformer, arguments, 1, "char")?
        .and_then(|s| s.chars().next())
        .unwrap_or('0'))
}

// =============================================================================
// String transformers
// =============================================================================

#[derive(Debug)]
pub struct Trim;

impl Transformer for Trim {
    fn name(&self) -> &'static str {
        "Trim"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let chars = optional_string_arg(self.name(), arguments, 0, "chars")?;
        map_text(self.name(), payload, |s| {
            Ok(Value::String(match chars {
                Some(chars) => s.trim_matches(|c| chars.contains(c)).to_string(),
                None => s.trim().to_string(),
            }))
        })
    }
}

#[derive(Debug)]
pub struct Uppercase;

impl Transformer for Uppercase {
    fn name(&self) -> &'static str {
        "Uppercase"
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        map_text(self.name(), payload, |s| Ok(Value::String(s.to_uppercase())))
    }
}

#[derive(Debug)]
pub struct Lowercase;

impl Transformer for Lowercase {
    fn name(&self) -> &'static str {
        "Lowercase"
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        map_text(self.name(), payload, |s| Ok(Value::String(s.to_lowercase())))
    }
}

#[derive(Debug)]
pub struct Replace;

impl Transformer for Replace {
    fn name(&self) -> &'static str {
        "Replace"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let pattern = string_arg(self.name(), arguments, 0, "pattern")?;
        let replacement = optional_string_arg(self.name(), arguments, 1, "replacement")?.unwrap_or_default();
        let re = compile_pattern(&pattern)
            .map_err(|e| TransformationError::invalid_argument(self.name(), e.to_string()))?;
        map_text(self.name(), payload, |s| {
            Ok(Value::String(re.replace_all(&s, replacement.as_str()).to_string()))
        })
    }
}

#[derive(Debug)]
pub struct PadStart;

impl Transformer for PadStart {
    fn name(&self) -> &'static str {
        "PadStart"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let length = usize_arg(self.name(), arguments, 0, "length")?;
        let pad = pad_char(self.name(), arguments)?;
        map_text(self.name(), payload, |s| {
            let missing = length.saturating_sub(s.chars().count());
            let padding: String = std::iter::repeat(pad).take(missing).collect();
            Ok(Value::String(format!("{}{}", padding, s)))
        })
    }
}

#[derive(Debug)]
pub struct PadEnd;

impl Transformer for PadEnd {
    fn name(&self) -> &'static str {
        "PadEnd"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let length = usize_arg(self.name(), arguments, 0, "length")?;
        let pad = pad_char(self.name(), arguments)?;
        map_text(self.name(), payload, |s| {
            let missing = length.saturating_sub(s.chars().count());
            let padding: String = std::iter::repeat(pad).take(missing).collect();
            Ok(Value::String(format!("{}{}", s, padding)))
        })
    }
}

/// First run of four digits as an integer, `null` when there is none.
#[derive(Debug)]
pub struct ExtractYear;

impl Transformer for ExtractYear {
    fn name(&self) -> &'static str {
        "ExtractYear"
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        map_text(self.name(), payload, |s| {
            let year = s
                .as_bytes()
                .windows(4)
                .position(|w| w.iter().all(u8::is_ascii_digit))
                .and_then(|start| s[start..start + 4].parse::<i64>().ok());
            Ok(year.map(Value::Int).unwrap_or(Value::Null))
        })
    }
}

#[derive(Debug)]
pub struct EnsurePrefix;

impl Transformer for EnsurePrefix {
    fn name(&self) -> &'static str {
        "EnsurePrefix"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let prefix = string_arg(self.name(), arguments, 0, "value")?;
        map_text(self.name(), payload, |s| {
            Ok(Value::String(if s.starts_with(&prefix) {
                s
            } else {
                format!("{}{}", prefix, s)
            }))
        })
    }
}

#[derive(Debug)]
pub struct EnsureSuffix;

impl Transformer for EnsureSuffix {
    fn name(&self) -> &'static str {
        "EnsureSuffix"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let suffix = string_arg(self.name(), arguments, 0, "value")?;
        map_text(self.name(), payload, |s| {
            Ok(Value::String(if s.ends_with(&suffix) {
                s
            } else {
                format!("{}{}", s, suffix)
            }))
        })
    }
}

/// Prepends each argument in turn: `Prepend(" - ", "Foo")` on `bar` gives `Foo - bar`.
#[derive(Debug)]
pub struct Prepend;

impl Transformer for Prepend {
    fn name(&self) -> &'static str {
        "Prepend"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let parts = text_parts(self.name(), arguments)?;
        let text = input_text(self.name(), &payload)?.unwrap_or_default();
        Ok(Value::String(
            parts.iter().fold(text, |acc, part| format!("{}{}", part, acc)),
        ))
    }
}

#[derive(Debug)]
pub struct Append;

impl Transformer for Append {
    fn name(&self) -> &'static str {
        "Append"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let parts = text_parts(self.name(), arguments)?;
        let text = input_text(self.name(), &payload)?.unwrap_or_default();
        Ok(Value::String(parts.iter().fold(text, |acc, part| acc + part)))
    }
}

/// Lookup table. Unmapped values become `default` when given, the empty string otherwise.
#[derive(Debug)]
pub struct Map;

impl Transformer for Map {
    fn name(&self) -> &'static str {
        "Map"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let mapping = arguments
            .named("mapping")
            .or_else(|| arguments.positional(0))
            .and_then(Value::as_map)
            .ok_or_else(|| TransformationError::invalid_argument(self.name(), "'mapping' must be an object"))?;
        let default = arguments
            .named("default")
            .or_else(|| arguments.positional(1))
            .cloned();
        let case_insensitive = arguments
            .named("case_insensitive")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        map_text(self.name(), payload, |s| {
            let found = if case_insensitive {
                let wanted = s.to_lowercase();
                mapping
                    .iter()
                    .find(|(key, _)| key.to_lowercase() == wanted)
                    .map(|(_, value)| value)
            } else {
                mapping.get(&s)
            };
            Ok(match (found, default) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default,
                (None, None) => Value::String(String::new()),
            })
        })
    }
}

#[derive(Debug)]
pub struct Split;

impl Transformer for Split {
    fn name(&self) -> &'static str {
        "Split"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let separator = optional_string_arg(self.name(), arguments, 0, "separator")?.unwrap_or_else(|| ",".into());
        if separator.is_empty() {
            return Err(TransformationError::invalid_argument(self.name(), "separator must not be empty"));
        }
        map_text(self.name(), payload, |s| {
            Ok(Value::List(
                s.split(separator.as_str())
                    .map(|part| Value::String(part.trim().to_string()))
                    .collect(),
            ))
        })
    }
}

/// Joins a whole list into one string.
#[derive(Debug)]
pub struct Join;

impl Transformer for Join {
    fn name(&self) -> &'static str {
        "Join"
    }

    fn broadcasts(&self) -> bool {
        false
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let separator = optional_string_arg(self.name(), arguments, 0, "separator")?.unwrap_or_else(|| ",".into());
        match payload {
            Value::List(items) => {
                let parts = items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(|item| input_text(self.name(), item).map(Option::unwrap_or_default))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::String(parts.join(&separator)))
            }
            other => map_text(self.name(), other, |s| Ok(Value::String(s))),
        }
    }
}

#[derive(Debug)]
pub struct ToBoolean;

impl ToBoolean {
    const TRUE_VALUES: [&'static str; 6] = ["true", "1", "yes", "oui", "o", "y"];
}

impl Transformer for ToBoolean {
    fn name(&self) -> &'static str {
        "ToBoolean"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let true_values: Vec<String> = match arguments.get(0) {
            None => Self::TRUE_VALUES.iter().map(|s| s.to_string()).collect(),
            Some(Value::List(items)) => items.iter().filter_map(Value::to_display_string).collect(),
            Some(_) => text_parts(self.name(), arguments)?,
        };
        Ok(match payload {
            Value::Bool(b) => Value::Bool(b),
            other => {
                let text = input_text(self.name(), &other)?.unwrap_or_default().to_lowercase();
                Value::Bool(true_values.iter().any(|t| t.to_lowercase() == text))
            }
        })
    }
}

/// Numbers stay as they are; strings become an integer, a float, or the
/// integer made of their digits. `null` when nothing numeric is left.
#[derive(Debug)]
pub struct ToNumber;

impl Transformer for ToNumber {
    fn name(&self) -> &'static str {
        "ToNumber"
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        match payload {
            Value::Int(_) | Value::Float(_) => Ok(payload),
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            other => map_text(self.name(), other, |s| {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(Value::Int(n));
                }
                if trimmed.contains('.') {
                    if let Ok(n) = trimmed.parse::<f64>() {
                        if n.is_finite() {
                            return Ok(Value::Float(n));
                        }
                    }
                }
                let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
                if digits.is_empty() {
                    return Ok(Value::Null);
                }
                let signed = if trimmed.starts_with('-') { format!("-{}", digits) } else { digits };
                Ok(signed.parse::<i64>().map(Value::Int).unwrap_or(Value::Null))
            }),
        }
    }
}

#[derive(Debug)]
pub struct ToString;

impl Transformer for ToString {
    fn name(&self) -> &'static str {
        "ToString"
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        Ok(Value::String(input_text(self.name(), &payload)?.unwrap_or_default()))
    }
}

#[derive(Debug)]
pub struct Substring;

impl Transformer for Substring {
    fn name(&self) -> &'static str {
        "Substring"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let start = usize_arg(self.name(), arguments, 0, "start")?;
        let length = optional_usize_arg(self.name(), arguments, 1, "length")?;
        map_text(self.name(), payload, |s| {
            let chars = s.chars().skip(start);
            Ok(Value::String(match length {
                Some(length) => chars.take(length).collect(),
                None => chars.collect(),
            }))
        })
    }
}

#[derive(Debug)]
pub struct Alphanumeric;

impl Transformer for Alphanumeric {
    fn name(&self) -> &'static str {
        "Alphanumeric"
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        map_text(self.name(), payload, |s| {
            Ok(Value::String(s.chars().filter(|c| c.is_alphanumeric()).collect()))
        })
    }
}

#[derive(Debug)]
pub struct DigitsOnly;

impl Transformer for DigitsOnly {
    fn name(&self) -> &'static str {
        "DigitsOnly"
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        map_text(self.name(), payload, |s| {
            Ok(Value::String(s.chars().filter(|c| c.is_ascii_digit()).collect()))
        })
    }
}

/// Reformat a date with chrono format strings.
///
/// Without an input format, RFC 3339 and a few common layouts are tried.
#[derive(Debug)]
pub struct DateFormat;

impl DateFormat {
    const DATE_TIME_LAYOUTS: [&'static str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];
    const DATE_LAYOUTS: [&'static str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y%m%d"];

    fn parse(text: &str, layout: Option<&str>) -> Option<NaiveDateTime> {
        let midnight = |date: NaiveDate| date.and_hms_opt(0, 0, 0);
        match layout {
            Some(layout) => NaiveDateTime::parse_from_str(text, layout)
                .ok()
                .or_else(|| NaiveDate::parse_from_str(text, layout).ok().and_then(midnight)),
            None => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.naive_local())
                .ok()
                .or_else(|| {
                    Self::DATE_TIME_LAYOUTS
                        .iter()
                        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
                })
                .or_else(|| {
                    Self::DATE_LAYOUTS
                        .iter()
                        .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
                        .and_then(midnight)
                }),
        }
    }
}

impl Transformer for DateFormat {
    fn name(&self) -> &'static str {
        "DateFormat"
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let output = string_arg(self.name(), arguments, 0, "format")?;
        let input = optional_string_arg(self.name(), arguments, 1, "input")?;
        map_text(self.name(), payload, |s| {
            let parsed = Self::parse(s.trim(), input.as_deref()).ok_or_else(|| {
                TransformationError::failed(self.name(), format!("could not parse '{}' as a date", s))
            })?;
            let mut formatted = String::new();
            write!(formatted, "{}", parsed.format(&output)).map_err(|_| {
                TransformationError::invalid_argument(self.name(), format!("invalid date format '{}'", output))
            })?;
            Ok(Value::String(formatted))
        })
    }
}

// =============================================================================
// Whole-value transformers
// =============================================================================

/// Replaces null, empty strings and empty lists with its argument.
#[derive(Debug)]
pub struct Default;

impl Transformer for Default {
    fn name(&self) -> &'static str {
        "Default"
    }

    fn broadcasts(&self) -> bool {
        false
    }

    fn transform(&self, payload: Value, arguments: &Arguments, _: &Context) -> Result<Value> {
        let fallback = arguments
            .get_or_named(0, "value")
            .ok_or_else(|| TransformationError::invalid_argument(self.name(), "missing argument 'value'"))?;
        Ok(if payload.is_empty_value() { fallback.clone() } else { payload })
    }
}

#[derive(Debug)]
pub struct First;

impl Transformer for First {
    fn name(&self) -> &'static str {
        "First"
    }

    fn broadcasts(&self) -> bool {
        false
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        Ok(match payload {
            Value::List(items) => items.into_iter().next().unwrap_or(Value::Null),
            other => other,
        })
    }
}

#[derive(Debug)]
pub struct Last;

impl Transformer for Last {
    fn name(&self) -> &'static str {
        "Last"
    }

    fn broadcasts(&self) -> bool {
        false
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        Ok(match payload {
            Value::List(items) => items.into_iter().last().unwrap_or(Value::Null),
            other => other,
        })
    }
}

#[derive(Debug)]
pub struct Count;

impl Transformer for Count {
    fn name(&self) -> &'static str {
        "Count"
    }

    fn broadcasts(&self) -> bool {
        false
    }

    fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value> {
        match payload {
            Value::List(items) => Ok(Value::from(items.len())),
            Value::Map(map) => Ok(Value::from(map.len())),
            Value::Null => Ok(Value::Int(0)),
            other => Err(TransformationError::invalid_input(
                self.name(),
                format!("expected a list or map, got {}", other.type_name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::apply_transformer;
    use serde_json::json;

    fn run(transformer: &dyn Transformer, payload: Value, args: Vec<Value>) -> Result<Value> {
        let arguments: Arguments = args.into_iter().collect();
        apply_transformer(transformer, payload, &arguments, &Context::new(), false)
    }

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_trim() {
        assert_eq!(run(&Trim, s("  hello  "), vec![]).unwrap(), s("hello"));
        assert_eq!(run(&Trim, s("--x--"), vec![s("-")]).unwrap(), s("x"));
        assert_eq!(run(&Trim, Value::Null, vec![]).unwrap(), Value::Null);
        assert_eq!(run(&Trim, Value::Int(5), vec![]).unwrap(), s("5"));
    }

    #[test]
    fn test_trim_rejects_maps() {
        let err = run(&Trim, Value::from(json!({"a": 1})), vec![]).unwrap_err();
        assert!(matches!(err, TransformationError::InvalidInputType { .. }));
    }

    #[test]
    fn test_string_transformers_broadcast() {
        assert_eq!(
            run(&Uppercase, Value::from(json!(["a", "b"])), vec![]).unwrap(),
            Value::from(json!(["A", "B"]))
        );
    }

    #[test]
    fn test_replace() {
        assert_eq!(
            run(&Replace, s("T-123.456.789-0"), vec![s("[-. ]"), s("")]).unwrap(),
            s("T1234567890")
        );
        assert_eq!(run(&Replace, s("ABC"), vec![s("/b/i"), s("x")]).unwrap(), s("AxC"));
        assert!(matches!(
            run(&Replace, s("x"), vec![s("(")]),
            Err(TransformationError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_padding() {
        assert_eq!(run(&PadStart, s("42"), vec![Value::Int(5)]).unwrap(), s("00042"));
        assert_eq!(run(&PadEnd, s("ab"), vec![Value::Int(4), s("*")]).unwrap(), s("ab**"));
        assert_eq!(run(&PadStart, s("toolong"), vec![Value::Int(3)]).unwrap(), s("toolong"));
        assert!(run(&PadStart, s("1"), vec![]).is_err());
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(run(&ExtractYear, s("15/03/2024"), vec![]).unwrap(), Value::Int(2024));
        assert_eq!(run(&ExtractYear, s("2023-12-25"), vec![]).unwrap(), Value::Int(2023));
        assert_eq!(run(&ExtractYear, s("n/a"), vec![]).unwrap(), Value::Null);
    }

    #[test]
    fn test_ensure_prefix_and_suffix() {
        assert_eq!(run(&EnsurePrefix, s("1234567890"), vec![s("T")]).unwrap(), s("T1234567890"));
        assert_eq!(run(&EnsurePrefix, s("T1234567890"), vec![s("T")]).unwrap(), s("T1234567890"));
        assert_eq!(run(&EnsureSuffix, s("file"), vec![s(".csv")]).unwrap(), s("file.csv"));
    }

    #[test]
    fn test_prepend_applies_parts_in_order() {
        assert_eq!(run(&Prepend, s("bar"), vec![s(" - "), s("Foo")]).unwrap(), s("Foo - bar"));
        assert_eq!(run(&Append, s("bar"), vec![s(" - "), s("Foo")]).unwrap(), s("bar - Foo"));
        assert_eq!(run(&Prepend, Value::Null, vec![s("x")]).unwrap(), s("x"));
    }

    #[test]
    fn test_map() {
        let mapping = Value::from(json!({"CA": "Composer", "A": "Author"}));
        assert_eq!(run(&Map, s("CA"), vec![mapping.clone()]).unwrap(), s("Composer"));
        assert_eq!(run(&Map, s("Unknown"), vec![mapping.clone()]).unwrap(), s(""));
        assert_eq!(
            run(&Map, s("Unknown"), vec![mapping.clone(), s("Other")]).unwrap(),
            s("Other")
        );

        let mut arguments: Arguments = vec![mapping].into_iter().collect();
        arguments.push(Some(s("case_insensitive")), Value::Bool(true));
        assert_eq!(
            Map.transform(s("ca"), &arguments, &Context::new()).unwrap(),
            s("Composer")
        );
    }

    #[test]
    fn test_split_and_join() {
        let split = run(&Split, s("a; b;c"), vec![s(";")]).unwrap();
        assert_eq!(split, Value::from(json!(["a", "b", "c"])));
        assert_eq!(run(&Join, split, vec![s("|")]).unwrap(), s("a|b|c"));
        assert_eq!(run(&Join, Value::from(json!([1, null, 2])), vec![]).unwrap(), s("1,2"));
    }

    #[test]
    fn test_to_boolean() {
        assert_eq!(run(&ToBoolean, s("Oui"), vec![]).unwrap(), Value::Bool(true));
        assert_eq!(run(&ToBoolean, s("non"), vec![]).unwrap(), Value::Bool(false));
        assert_eq!(run(&ToBoolean, s("si"), vec![s("si"), s("ja")]).unwrap(), Value::Bool(true));
        assert_eq!(run(&ToBoolean, Value::Bool(false), vec![]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(run(&ToNumber, s("123456789"), vec![]).unwrap(), Value::Int(123456789));
        assert_eq!(run(&ToNumber, s("123-456-789"), vec![]).unwrap(), Value::Int(123456789));
        assert_eq!(run(&ToNumber, s("-12"), vec![]).unwrap(), Value::Int(-12));
        assert_eq!(run(&ToNumber, s("3.5"), vec![]).unwrap(), Value::Float(3.5));
        assert_eq!(run(&ToNumber, s("none"), vec![]).unwrap(), Value::Null);
    }

    #[test]
    fn test_substring_and_filters() {
        assert_eq!(run(&Substring, s("héllo"), vec![Value::Int(1), Value::Int(3)]).unwrap(), s("éll"));
        assert_eq!(run(&Substring, s("hello"), vec![Value::Int(3)]).unwrap(), s("lo"));
        assert_eq!(run(&Alphanumeric, s("a-b c!1"), vec![]).unwrap(), s("abc1"));
        assert_eq!(run(&DigitsOnly, s("T-123.4"), vec![]).unwrap(), s("1234"));
    }

    #[test]
    fn test_date_format() {
        assert_eq!(
            run(&DateFormat, s("2024-03-15"), vec![s("%d/%m/%Y")]).unwrap(),
            s("15/03/2024")
        );
        assert_eq!(
            run(&DateFormat, s("15.03.2024"), vec![s("%Y-%m-%d"), s("%d.%m.%Y")]).unwrap(),
            s("2024-03-15")
        );
        assert_eq!(
            run(&DateFormat, s("2024-03-15T10:30:00+02:00"), vec![s("%H:%M")]).unwrap(),
            s("10:30")
        );
        assert!(matches!(
            run(&DateFormat, s("yesterday"), vec![s("%Y")]),
            Err(TransformationError::Failed { .. })
        ));
    }

    #[test]
    fn test_whole_value_transformers() {
        let list = Value::from(json!(["a", "b", "c"]));
        assert_eq!(run(&First, list.clone(), vec![]).unwrap(), s("a"));
        assert_eq!(run(&Last, list.clone(), vec![]).unwrap(), s("c"));
        assert_eq!(run(&Count, list, vec![]).unwrap(), Value::Int(3));
        assert_eq!(run(&Default, s(""), vec![s("n/a")]).unwrap(), s("n/a"));
        assert_eq!(run(&Default, Value::from(json!([])), vec![s("n/a")]).unwrap(), s("n/a"));
        assert_eq!(run(&Default, s("x"), vec![s("n/a")]).unwrap(), s("x"));
    }

    #[test]
    fn test_defaults_have_unique_names() {
        let mut names: Vec<&str> = defaults().iter().map(|t| t.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
