//! Bundled validators.
//!
//! A validator either accepts the payload or fails with every problem it
//! found. Validators never change the payload.

use std::sync::Arc;

use super::{compile_pattern, Arguments, Validator};
use crate::error::ValidationError;
use crate::value::{Context, Value};

type Result<T> = std::result::Result<T, ValidationError>;

/// Every bundled validator, for [`super::Registry::with_defaults`].
pub fn defaults() -> Vec<Arc<dyn Validator>> {
    vec![
        Arc::new(IsNotEmpty),
        Arc::new(IsString),
        Arc::new(IsNumeric),
        Arc::new(IsList),
        Arc::new(MatchesRegex),
        Arc::new(InList),
        Arc::new(Length),
        Arc::new(Range),
        Arc::new(MatchesSchema),
    ]
}

fn number_arg(validator: &'static str, arguments: &Arguments, index: usize, name: &str) -> Result<Option<f64>> {
    match arguments.get_or_named(index, name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => numeric(value).map(Some).ok_or_else(|| {
            ValidationError::invalid_argument(validator, format!("'{}' must be a number, got {}", name, value))
        }),
    }
}

/// Numbers and numeric strings as `f64`.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[derive(Debug)]
pub struct IsNotEmpty;

impl Validator for IsNotEmpty {
    fn name(&self) -> &'static str {
        "IsNotEmpty"
    }

    fn validate(&self, payload: &Value, _: &Arguments, _: &Context) -> Result<()> {
        let empty = match payload {
            Value::String(s) => s.trim().is_empty(),
            other => other.is_empty_value(),
        };
        if empty {
            return Err(ValidationError::failed(self.name(), "value is empty", payload));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct IsString;

impl Validator for IsString {
    fn name(&self) -> &'static str {
        "IsString"
    }

    fn validate(&self, payload: &Value, _: &Arguments, _: &Context) -> Result<()> {
        match payload {
            Value::String(_) => Ok(()),
            other => Err(ValidationError::failed(
                self.name(),
                format!("expected a string, got {}", other.type_name()),
                payload,
            )),
        }
    }
}

/// Numbers, and strings that parse as one.
#[derive(Debug)]
pub struct IsNumeric;

impl Validator for IsNumeric {
    fn name(&self) -> &'static str {
        "IsNumeric"
    }

    fn validate(&self, payload: &Value, _: &Arguments, _: &Context) -> Result<()> {
        if numeric(payload).is_none() {
            return Err(ValidationError::failed(
                self.name(),
                format!("'{}' is not numeric", payload),
                payload,
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct IsList;

impl Validator for IsList {
    fn name(&self) -> &'static str {
        "IsList"
    }

    fn validate(&self, payload: &Value, _: &Arguments, _: &Context) -> Result<()> {
        match payload {
            Value::List(_) => Ok(()),
            other => Err(ValidationError::failed(
                self.name(),
                format!("expected a list, got {}", other.type_name()),
                payload,
            )),
        }
    }
}

#[derive(Debug)]
pub struct MatchesRegex;

impl Validator for MatchesRegex {
    fn name(&self) -> &'static str {
        "MatchesRegex"
    }

    fn validate(&self, payload: &Value, arguments: &Arguments, _: &Context) -> Result<()> {
        let pattern = arguments
            .get_or_named(0, "pattern")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::invalid_argument(self.name(), "missing string argument 'pattern'"))?;
        let re = compile_pattern(pattern).map_err(|e| ValidationError::invalid_argument(self.name(), e.to_string()))?;

        let text = match payload {
            Value::String(_) | Value::Int(_) | Value::Float(_) => payload.to_display_string().unwrap_or_default(),
            other => {
                return Err(ValidationError::invalid_input(
                    self.name(),
                    format!("expected a string or number, got {}", other.type_name()),
                    payload,
                ))
            }
        };
        if !re.is_match(&text) {
            return Err(ValidationError::failed(
                self.name(),
                format!("'{}' does not match {}", text, pattern),
                payload,
            ));
        }
        Ok(())
    }
}

/// Accepts values listed as arguments: `InList("a", "b")` or `InList(["a", "b"])`.
#[derive(Debug)]
pub struct InList;

impl Validator for InList {
    fn name(&self) -> &'static str {
        "InList"
    }

    fn validate(&self, payload: &Value, arguments: &Arguments, _: &Context) -> Result<()> {
        let allowed: Vec<&Value> = match (arguments.len(), arguments.get(0)) {
            (0, _) => return Err(ValidationError::invalid_argument(self.name(), "no allowed values given")),
            (1, Some(Value::List(items))) => items.iter().collect(),
            _ => arguments.values().collect(),
        };
        if allowed.iter().any(|value| *value == payload) {
            return Ok(());
        }
        let listed: Vec<String> = allowed.iter().map(|value| value.to_string()).collect();
        Err(ValidationError::failed(
            self.name(),
            format!("'{}' is not one of [{}]", payload, listed.join(", ")),
            payload,
        ))
    }
}

/// Character count of a string, or item count of a list, within `min..=max`.
#[derive(Debug)]
pub struct Length;

impl Validator for Length {
    fn name(&self) -> &'static str {
        "Length"
    }

    fn validate(&self, payload: &Value, arguments: &Arguments, _: &Context) -> Result<()> {
        let min = number_arg(self.name(), arguments, 0, "min")?.unwrap_or(0.0);
        let max = number_arg(self.name(), arguments, 1, "max")?;
        let count = match payload {
            Value::String(s) => s.chars().count(),
            Value::List(items) => items.len(),
            other => {
                return Err(ValidationError::invalid_input(
                    self.name(),
                    format!("expected a string or list, got {}", other.type_name()),
                    payload,
                ))
            }
        };
        let length = count as f64;

        let mut messages = Vec::new();
        if length < min {
            messages.push(format!("length {} is below the minimum of {}", length, min));
        }
        if let Some(max) = max.filter(|max| length > *max) {
            messages.push(format!("length {} is above the maximum of {}", length, max));
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Failed {
                validator: self.name().to_string(),
                messages,
                data: Some(payload.clone()),
            })
        }
    }
}

#[derive(Debug)]
pub struct Range;

impl Validator for Range {
    fn name(&self) -> &'static str {
        "Range"
    }

    fn validate(&self, payload: &Value, arguments: &Arguments, _: &Context) -> Result<()> {
        let min = number_arg(self.name(), arguments, 0, "min")?;
        let max = number_arg(self.name(), arguments, 1, "max")?;
        let n = numeric(payload).ok_or_else(|| {
            ValidationError::invalid_input(
                self.name(),
                format!("expected a number, got {}", payload.type_name()),
                payload,
            )
        })?;
        if min.map_or(false, |min| n < min) || max.map_or(false, |max| n > max) {
            let bound = |b: Option<f64>| b.map(|b| b.to_string()).unwrap_or_else(|| "..".into());
            return Err(ValidationError::failed(
                self.name(),
                format!("{} is outside [{}, {}]", n, bound(min), bound(max)),
                payload,
            ));
        }
        Ok(())
    }
}

/// JSON Schema (draft 7) validation. The schema is an object argument or a
/// JSON string.
#[derive(Debug)]
pub struct MatchesSchema;

impl Validator for MatchesSchema {
    fn name(&self) -> &'static str {
        "MatchesSchema"
    }

    fn validate(&self, payload: &Value, arguments: &Arguments, _: &Context) -> Result<()> {
        let schema = match arguments.get_or_named(0, "schema") {
            Some(Value::String(text)) => serde_json::from_str(text)
                .map_err(|e| ValidationError::invalid_argument(self.name(), format!("schema is not JSON: {}", e)))?,
            Some(value @ Value::Map(_)) => value.to_json(),
            _ => return Err(ValidationError::invalid_argument(self.name(), "missing object argument 'schema'")),
        };
        let validator = jsonschema::draft7::new(&schema)
            .map_err(|e| ValidationError::invalid_argument(self.name(), format!("invalid schema: {}", e)))?;

        let data = payload.to_json();
        let messages: Vec<String> = validator.iter_errors(&data).map(|e| e.to_string()).collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Failed {
                validator: self.name().to_string(),
                messages,
                data: Some(payload.clone()),
            })
        }
    }
}
