//! Transformers, validators and the registry that names them.
//!
//! Every unit implements one fixed capability, [`Transformer::transform`] or
//! [`Validator::validate`]. The runtime never looks inside a unit: it resolves
//! the name once through a [`Registry`] while building, then calls the trait.

mod registry;
pub mod transformers;
pub mod validators;

pub use registry::Registry;

use regex::Regex;
use std::fmt;

use crate::error::{PipelineError, TransformationError, ValidationError};
use crate::models::{ArgumentIterator, ArgumentKey, ArgumentValue};
use crate::value::{Context, Value, ValueMap};

/// A named payload transformation.
pub trait Transformer: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn transform(
        &self,
        payload: Value,
        arguments: &Arguments,
        context: &Context,
    ) -> Result<Value, TransformationError>;

    /// Whether a list payload is transformed item by item.
    fn broadcasts(&self) -> bool {
        true
    }
}

/// A named payload check.
pub trait Validator: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn validate(
        &self,
        payload: &Value,
        arguments: &Arguments,
        context: &Context,
    ) -> Result<(), ValidationError>;
}

/// Run `transformer` over `payload`, one level of list broadcasting included.
///
/// `recursing` is set for the per-item calls of a broadcast so that a list
/// nested inside a list reaches the transformer whole.
pub fn apply_transformer(
    transformer: &dyn Transformer,
    payload: Value,
    arguments: &Arguments,
    context: &Context,
    recursing: bool,
) -> Result<Value, TransformationError> {
    match payload {
        Value::List(items) if transformer.broadcasts() && !recursing => items
            .into_iter()
            .map(|item| apply_transformer(transformer, item, arguments, context, true))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => transformer.transform(other, arguments, context),
    }
}

// =============================================================================
// Resolved arguments
// =============================================================================

/// Arguments with every extraction already resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    items: Vec<(Option<Value>, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: Option<Value>, value: Value) {
        self.items.push((key, value));
    }

    /// Argument at `index`, keyed or not.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index).map(|(_, value)| value)
    }

    /// The `index`-th argument without a key.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.items
            .iter()
            .filter(|(key, _)| key.is_none())
            .nth(index)
            .map(|(_, value)| value)
    }

    /// Argument whose key is the string `name`.
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|(key, _)| key.as_ref().and_then(Value::as_str) == Some(name))
            .map(|(_, value)| value)
    }

    /// Named argument if present, otherwise the one at `index`.
    pub fn get_or_named(&self, index: usize, name: &str) -> Option<&Value> {
        self.named(name).or_else(|| self.get(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&Value>, &Value)> {
        self.items.iter().map(|(key, value)| (key.as_ref(), value))
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(|value| (None, value)).collect(),
        }
    }
}

/// Resolve every extraction in `arguments` against `payload` and `context`.
pub fn resolve_arguments(
    arguments: Option<&ArgumentIterator>,
    payload: &Value,
    context: &Context,
) -> Result<Arguments, PipelineError> {
    let mut resolved = Arguments::new();
    if let Some(arguments) = arguments {
        for argument in arguments {
            let key = match &argument.key {
                None => None,
                Some(ArgumentKey::Scalar(key)) => Some(key.clone()),
                Some(ArgumentKey::Extraction(extraction)) => Some(extraction.resolve(payload, context)?),
            };
            resolved.push(key, resolve_value(&argument.value, payload, context)?);
        }
    }
    Ok(resolved)
}

fn resolve_value(value: &ArgumentValue, payload: &Value, context: &Context) -> Result<Value, PipelineError> {
    match value {
        ArgumentValue::Scalar(value) => Ok(value.clone()),
        ArgumentValue::Extraction(extraction) => extraction.resolve(payload, context),
        ArgumentValue::List(nested) => {
            let nested = resolve_arguments(Some(nested), payload, context)?;
            if nested.items.iter().all(|(key, _)| key.is_none()) {
                return Ok(Value::List(nested.items.into_iter().map(|(_, v)| v).collect()));
            }
            let map: ValueMap = nested
                .items
                .into_iter()
                .enumerate()
                .map(|(position, (key, value))| {
                    let key = match key {
                        Some(key) => key.to_display_string().unwrap_or_else(|| key.to_string()),
                        None => position.to_string(),
                    };
                    (key, value)
                })
                .collect();
            Ok(Value::Map(map))
        }
    }
}

/// Compile a regular expression, accepting PCRE-style `/pattern/flags` delimiters.
///
/// Supported flags are `i`, `m`, `s` and `x`; `u` is accepted and ignored.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let delimited = pattern.strip_prefix('/').and_then(|rest| {
        let end = rest.rfind('/')?;
        let flags = &rest[end + 1..];
        flags
            .chars()
            .all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'u'))
            .then(|| (&rest[..end], flags))
    });
    let source = match delimited {
        Some((body, flags)) => {
            let inline: String = flags.chars().filter(|c| *c != 'u').collect();
            if inline.is_empty() {
                body.to_string()
            } else {
                format!("(?{}){}", inline, body)
            }
        }
        None => pattern.to_string(),
    };
    Regex::new(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;
    use serde_json::json;

    fn arguments_of(dsl: &str) -> ArgumentIterator {
        parse(dsl).unwrap().get(0).unwrap().arguments.clone().unwrap()
    }

    #[derive(Debug)]
    struct Double;

    impl Transformer for Double {
        fn name(&self) -> &'static str {
            "Double"
        }

        fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value, TransformationError> {
            payload
                .as_i64()
                .map(|n| Value::Int(n * 2))
                .ok_or_else(|| TransformationError::invalid_input("Double", payload.type_name()))
        }
    }

    #[test]
    fn test_broadcast_is_one_level_deep() {
        let args = Arguments::new();
        let ctx = Context::new();
        let flat = Value::from(json!([1, 2]));
        assert_eq!(
            apply_transformer(&Double, flat, &args, &ctx, false).unwrap(),
            Value::from(json!([2, 4]))
        );

        let nested = Value::from(json!([[1]]));
        assert!(matches!(
            apply_transformer(&Double, nested, &args, &ctx, false),
            Err(TransformationError::InvalidInputType { .. })
        ));
    }

    #[test]
    fn test_resolve_scalars_and_extractions() {
        let payload = Value::from(json!({"name": "Ada"}));
        let context = Context::from_value(Value::from(json!({"cfg": {"sep": "-"}}))).unwrap();
        let resolved = resolve_arguments(Some(&arguments_of("F(1, $name, $cfg::sep)")), &payload, &context).unwrap();
        let values: Vec<&Value> = resolved.values().collect();
        assert_eq!(values, vec![&Value::Int(1), &Value::from("Ada"), &Value::from("-")]);
    }

    #[test]
    fn test_resolve_nested_lists_and_maps() {
        let payload = Value::from(json!({"code": "CA"}));
        let resolved = resolve_arguments(
            Some(&arguments_of(r#"F([1, $code], {"CA": "Composer", $code: 2}, default: "x")"#)),
            &payload,
            &Context::new(),
        )
        .unwrap();
        assert_eq!(resolved.get(0), Some(&Value::from(json!([1, "CA"]))));
        let map = resolved.get(1).unwrap().as_map().unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["CA"]);
        assert_eq!(map.get("CA"), Some(&Value::Int(2)));
        assert_eq!(resolved.named("default"), Some(&Value::from("x")));
        assert_eq!(resolved.get_or_named(7, "default"), Some(&Value::from("x")));
    }

    #[test]
    fn test_compile_pattern_delimiters() {
        let re = compile_pattern("/^foo -.*[^ ]$/").unwrap();
        assert!(re.is_match("foo - bar"));
        assert!(!re.is_match("foo - bar "));

        let re = compile_pattern("/^abc$/i").unwrap();
        assert!(re.is_match("ABC"));

        let plain = compile_pattern("/usr/bin").unwrap();
        assert!(plain.is_match("/usr/bin/env"));
        assert!(compile_pattern("(").is_err());
    }

    #[test]
    fn test_failed_extraction_propagates() {
        let result = resolve_arguments(Some(&arguments_of("F($missing)")), &Value::from(json!({})), &Context::new());
        assert!(matches!(result, Err(PipelineError::Extraction(_))));
    }
}
