//! Accessor resolution over the value model.
//!
//! An accessor is a `.`-separated path. A segment ending in `()` calls a
//! zero-argument method, anything else is a key or property lookup:
//!
//! ```text
//! order.lines.0.sku          map keys and list indexes
//! order.getCustomer().name   method call on an object
//! config::currency.code      root switched to context["config"]
//! ```
//!
//! Over a list, a key lookup fails unless the segment is an index, while a
//! method call is made on every item and returns the list of results.

use std::borrow::Cow;

use crate::error::{ExtractionError, ExtractionResult};
use crate::value::{Context, Value};

/// Resolve `accessor` against `source`, or against a context entry when the
/// first segment reads `key::rest`.
///
/// The empty accessor returns `source` unchanged.
///
/// # Example
/// ```
/// use recast::{extract, Context, Value};
/// use serde_json::json;
///
/// let source = Value::from(json!({"foo": {"bar": "baz"}}));
/// let found = extract(&source, "foo.bar", &Context::new()).unwrap();
/// assert_eq!(found, Value::from("baz"));
/// ```
pub fn extract(source: &Value, accessor: &str, context: &Context) -> ExtractionResult<Value> {
    let trimmed = accessor.trim();
    if trimmed.is_empty() {
        return Ok(source.clone());
    }

    let first = trimmed.split('.').next().unwrap_or_default();
    let (root, path) = match first.split_once("::") {
        Some((key, _)) => {
            let root = context
                .get(key.trim())
                .ok_or_else(|| ExtractionError::MissingContextKey {
                    accessor: accessor.to_string(),
                    segment: key.trim().to_string(),
                })?;
            (root, &trimmed[key.len() + 2..])
        }
        None => (source, trimmed),
    };

    if path.is_empty() {
        return Ok(root.clone());
    }

    let mut current = Cow::Borrowed(root);
    for segment in path.split('.') {
        current = match current {
            Cow::Borrowed(value) => step(value, segment, accessor)?,
            Cow::Owned(value) => Cow::Owned(step(&value, segment, accessor)?.into_owned()),
        };
    }
    Ok(current.into_owned())
}

fn step<'a>(current: &'a Value, segment: &str, accessor: &str) -> ExtractionResult<Cow<'a, Value>> {
    let segment = segment.trim();
    match segment.strip_suffix("()") {
        Some(method) => call(current, method, segment, accessor).map(Cow::Owned),
        None => lookup(current, segment, accessor),
    }
}

fn lookup<'a>(current: &'a Value, segment: &str, accessor: &str) -> ExtractionResult<Cow<'a, Value>> {
    let missing = || ExtractionError::MissingKey {
        accessor: accessor.to_string(),
        segment: segment.to_string(),
    };
    match current {
        Value::Map(map) => map.get(segment).map(Cow::Borrowed).ok_or_else(missing),
        Value::Object(object) => object.property(segment).map(Cow::Owned).ok_or_else(missing),
        Value::List(items) => match segment.parse::<usize>() {
            Ok(index) => items.get(index).map(Cow::Borrowed).ok_or_else(missing),
            // Property access does not broadcast.
            Err(_) if items.iter().any(|item| !item.is_scalar()) => Err(ExtractionError::Ambiguous {
                accessor: accessor.to_string(),
                segment: segment.to_string(),
            }),
            Err(_) => Err(mismatch(current, segment, accessor)),
        },
        _ => Err(mismatch(current, segment, accessor)),
    }
}

fn call(current: &Value, method: &str, segment: &str, accessor: &str) -> ExtractionResult<Value> {
    match current {
        Value::Object(object) => object
            .call(method)
            .ok_or_else(|| ExtractionError::MissingMethod {
                accessor: accessor.to_string(),
                segment: segment.to_string(),
            }),
        // Method calls broadcast over every item.
        Value::List(items) => items
            .iter()
            .map(|item| call(item, method, segment, accessor))
            .collect::<ExtractionResult<Vec<_>>>()
            .map(Value::List),
        Value::Map(_) => Err(ExtractionError::MissingMethod {
            accessor: accessor.to_string(),
            segment: segment.to_string(),
        }),
        _ => Err(mismatch(current, segment, accessor)),
    }
}

fn mismatch(current: &Value, segment: &str, accessor: &str) -> ExtractionError {
    ExtractionError::TypeMismatch {
        accessor: accessor.to_string(),
        segment: segment.to_string(),
        found: current.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ObjectHandle, PayloadStream, RecordObject, ValueMap};
    use serde_json::json;
    use std::sync::Arc;

    fn object(x: i64) -> Value {
        let fields: ValueMap = vec![("x", Value::Int(x))].into_iter().collect();
        Value::Object(Arc::new(RecordObject::new("Point", fields)))
    }

    #[test]
    fn test_nested_map_lookup() {
        let source = Value::from(json!({"foo": {"bar": "baz"}}));
        assert_eq!(extract(&source, "foo.bar", &Context::new()).unwrap(), Value::from("baz"));
    }

    #[test]
    fn test_empty_accessor_returns_source() {
        let source = Value::from(json!([1, 2]));
        assert_eq!(extract(&source, "", &Context::new()).unwrap(), source);
        assert_eq!(extract(&source, "  ", &Context::new()).unwrap(), source);
    }

    #[test]
    fn test_property_over_list_of_maps_is_ambiguous() {
        let source = Value::from(json!([{"p": 1}, {"p": 2}]));
        let err = extract(&source, "p", &Context::new()).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::Ambiguous {
                accessor: "p".into(),
                segment: "p".into()
            }
        );
    }

    #[test]
    fn test_method_call_broadcasts_over_list() {
        // Asymmetric on purpose: `x` over the same list would be ambiguous.
        let source = Value::List(vec![object(1), object(2)]);
        assert_eq!(
            extract(&source, "getX()", &Context::new()).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert!(matches!(
            extract(&source, "x", &Context::new()),
            Err(ExtractionError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_context_root() {
        let context = Context::from_value(Value::from(json!({"cfg": {"name": "v"}}))).unwrap();
        assert_eq!(
            extract(&Value::Int(99), "cfg::name", &context).unwrap(),
            Value::from("v")
        );
        assert_eq!(
            extract(&Value::Null, "cfg::", &context).unwrap(),
            Value::from(json!({"name": "v"}))
        );
    }

    #[test]
    fn test_context_root_with_deeper_path() {
        let context =
            Context::from_value(Value::from(json!({"config": {"currency": {"code": "EUR"}}}))).unwrap();
        assert_eq!(
            extract(&Value::Null, "config::currency.code", &context).unwrap(),
            Value::from("EUR")
        );
    }

    #[test]
    fn test_missing_context_key() {
        let err = extract(&Value::Null, "nope::x", &Context::new()).unwrap_err();
        assert_eq!(err.segment(), "nope");
        assert!(matches!(err, ExtractionError::MissingContextKey { .. }));
    }

    #[test]
    fn test_list_index_and_missing_key() {
        let source = Value::from(json!({"lines": [{"sku": "A"}, {"sku": "B"}]}));
        let context = Context::new();
        assert_eq!(extract(&source, "lines.1.sku", &context).unwrap(), Value::from("B"));
        assert!(matches!(
            extract(&source, "lines.5", &context),
            Err(ExtractionError::MissingKey { .. })
        ));
        let err = extract(&source, "lines.0.price", &context).unwrap_err();
        assert_eq!(err.accessor(), "lines.0.price");
        assert_eq!(err.segment(), "price");
    }

    #[test]
    fn test_type_mismatch_on_scalars() {
        let source = Value::from(json!({"name": "x"}));
        assert!(matches!(
            extract(&source, "name.first", &Context::new()),
            Err(ExtractionError::TypeMismatch { found: "string", .. })
        ));
        assert!(matches!(
            extract(&source, "name.length()", &Context::new()),
            Err(ExtractionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_object_properties_and_missing_methods() {
        let source = object(5);
        assert_eq!(extract(&source, "x", &Context::new()).unwrap(), Value::Int(5));
        assert_eq!(
            extract(&source, "toArray().x", &Context::new()).unwrap(),
            Value::Int(5)
        );
        assert!(matches!(
            extract(&source, "getY()", &Context::new()),
            Err(ExtractionError::MissingMethod { .. })
        ));
    }

    #[test]
    fn test_methods_on_maps_are_missing() {
        let source = Value::from(json!({"a": 1}));
        assert!(matches!(
            extract(&source, "count()", &Context::new()),
            Err(ExtractionError::MissingMethod { .. })
        ));
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let source = Value::from(json!({"foo": [1, 2]}));
        let context = Context::new();
        let first = extract(&source, "foo.0", &context).unwrap();
        let second = extract(&source, "foo.0", &context).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_streams_cannot_be_indexed() {
        let source = Value::Stream(PayloadStream::new(vec![Value::Int(1)]));
        assert!(matches!(
            extract(&source, "0", &Context::new()),
            Err(ExtractionError::TypeMismatch { found: "stream", .. })
        ));
    }

    #[test]
    fn test_object_trait_is_usable_directly() {
        #[derive(Debug)]
        struct Clock;
        impl ObjectHandle for Clock {
            fn class_name(&self) -> &str {
                "Clock"
            }
            fn property(&self, _name: &str) -> Option<Value> {
                None
            }
            fn call(&self, method: &str) -> Option<Value> {
                (method == "now").then(|| Value::Int(1_700_000_000))
            }
        }
        let source = Value::from(json!({"clock": null}));
        let mut map = source.as_map().unwrap().clone();
        map.insert("clock", Value::Object(Arc::new(Clock)));
        assert_eq!(
            extract(&Value::Map(map), "clock.now()", &Context::new()).unwrap(),
            Value::Int(1_700_000_000)
        );
    }
}
