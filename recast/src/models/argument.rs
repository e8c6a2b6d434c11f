//! Arguments of DSL invocations.

use serde::Serialize;

use super::extraction::Extraction;
use crate::catalog::Registry;
use crate::error::RegistryError;
use crate::value::Value;

/// The key of a keyed argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgumentKey {
    Scalar(Value),
    /// Resolved against the payload when the invocation runs.
    Extraction(Extraction),
}

/// The value of an argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgumentValue {
    Scalar(Value),
    /// Nested literal array or object.
    List(ArgumentIterator),
    /// Resolved against the payload when the invocation runs.
    Extraction(Extraction),
}

/// One positional or keyed value of an argument list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<ArgumentKey>,
    pub value: ArgumentValue,
}

impl Argument {
    pub fn new(value: ArgumentValue) -> Self {
        Self { key: None, value }
    }

    pub fn keyed(key: ArgumentKey, value: ArgumentValue) -> Self {
        Self { key: Some(key), value }
    }

    /// Positional scalar argument.
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::new(ArgumentValue::Scalar(value.into()))
    }

    /// Positional extraction argument.
    pub fn extraction(extraction: Extraction) -> Self {
        Self::new(ArgumentValue::Extraction(extraction))
    }

    /// Keyed argument with a scalar key.
    pub fn named(key: impl Into<Value>, value: ArgumentValue) -> Self {
        Self::keyed(ArgumentKey::Scalar(key.into()), value)
    }

    fn bind(&mut self, registry: &Registry) -> Result<(), RegistryError> {
        if let Some(ArgumentKey::Extraction(extraction)) = &mut self.key {
            extraction.bind(registry)?;
        }
        match &mut self.value {
            ArgumentValue::Scalar(_) => Ok(()),
            ArgumentValue::List(items) => items.bind(registry),
            ArgumentValue::Extraction(extraction) => extraction.bind(registry),
        }
    }
}

// =============================================================================
// Raw form
// =============================================================================

/// Key of an entry in the raw nested form of an [`ArgumentIterator`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawKey {
    /// Unkeyed item at this position.
    Position(usize),
    Scalar(Value),
    Extraction(Extraction),
}

/// Value of an entry in the raw nested form of an [`ArgumentIterator`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawArgument {
    Scalar(Value),
    Extraction(Extraction),
    Array(Vec<(RawKey, RawArgument)>),
}

impl From<Value> for RawArgument {
    /// Lists become positional arrays, maps become keyed arrays.
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => RawArgument::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| (RawKey::Position(i), RawArgument::from(item)))
                    .collect(),
            ),
            Value::Map(map) => RawArgument::Array(
                map.into_iter()
                    .map(|(k, v)| (RawKey::Scalar(Value::String(k)), RawArgument::from(v)))
                    .collect(),
            ),
            other => RawArgument::Scalar(other),
        }
    }
}

// =============================================================================
// ArgumentIterator
// =============================================================================

/// Ordered collection of [`Argument`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ArgumentIterator {
    items: Vec<Argument>,
}

impl ArgumentIterator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: Argument) {
        self.items.push(item);
    }

    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.items.get(index)
    }

    /// First argument whose scalar key equals `key`.
    pub fn get_by_key(&self, key: &Value) -> Option<&Argument> {
        self.items
            .iter()
            .find(|item| matches!(&item.key, Some(ArgumentKey::Scalar(k)) if k == key))
    }

    /// Append the items of `other`; keyed items replace items with the same scalar key.
    pub fn merge(&mut self, other: ArgumentIterator) {
        for item in other.items {
            let existing = match &item.key {
                Some(ArgumentKey::Scalar(key)) => self
                    .items
                    .iter()
                    .position(|own| matches!(&own.key, Some(ArgumentKey::Scalar(k)) if k == key)),
                _ => None,
            };
            match existing {
                Some(index) => self.items[index] = item,
                None => self.items.push(item),
            }
        }
    }

    pub fn filter<F>(&self, mut predicate: F) -> ArgumentIterator
    where
        F: FnMut(&Argument) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).cloned().collect()
    }

    /// Depth-first visit of every argument, nested lists included.
    pub fn walk<F>(&self, visitor: &mut F)
    where
        F: FnMut(&Argument),
    {
        for item in &self.items {
            visitor(item);
            if let ArgumentValue::List(nested) = &item.value {
                nested.walk(visitor);
            }
        }
    }

    /// Raw nested form; [`ArgumentIterator::create`] rebuilds an equal iterator from it.
    pub fn to_array(&self) -> Vec<(RawKey, RawArgument)> {
        self.items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let key = match &item.key {
                    None => RawKey::Position(position),
                    Some(ArgumentKey::Scalar(key)) => RawKey::Scalar(key.clone()),
                    Some(ArgumentKey::Extraction(extraction)) => RawKey::Extraction(extraction.clone()),
                };
                let value = match &item.value {
                    ArgumentValue::Scalar(value) => RawArgument::Scalar(value.clone()),
                    ArgumentValue::List(nested) => RawArgument::Array(nested.to_array()),
                    ArgumentValue::Extraction(extraction) => RawArgument::Extraction(extraction.clone()),
                };
                (key, value)
            })
            .collect()
    }

    pub fn create(raw: Vec<(RawKey, RawArgument)>) -> Self {
        raw.into_iter()
            .map(|(key, value)| {
                let key = match key {
                    RawKey::Position(_) => None,
                    RawKey::Scalar(key) => Some(ArgumentKey::Scalar(key)),
                    RawKey::Extraction(extraction) => Some(ArgumentKey::Extraction(extraction)),
                };
                let value = match value {
                    RawArgument::Scalar(value) => ArgumentValue::Scalar(value),
                    RawArgument::Array(nested) => ArgumentValue::List(Self::create(nested)),
                    RawArgument::Extraction(extraction) => ArgumentValue::Extraction(extraction),
                };
                Argument { key, value }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.items.iter()
    }

    /// Bind every inline transformation chain found in nested extractions.
    pub fn bind(&mut self, registry: &Registry) -> Result<(), RegistryError> {
        self.items.iter_mut().try_for_each(|item| item.bind(registry))
    }
}

impl FromIterator<Argument> for ArgumentIterator {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ArgumentIterator {
    type Item = Argument;
    type IntoIter = std::vec::IntoIter<Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArgumentIterator {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::convert_argument;
    use serde_json::json;

    fn parsed(pieces: &[&str]) -> ArgumentIterator {
        pieces.iter().map(|p| convert_argument(p).unwrap()).collect()
    }

    #[test]
    fn test_create_from_to_array_is_identity() {
        let samples = vec![
            ArgumentIterator::new(),
            parsed(&["1", "\"two\"", "null", "-4.5"]),
            parsed(&["$config::bar", "$foo.bar|Trim|Prepend(\"x\")"]),
            parsed(&["[1, [2, 3], {\"k\": \"v\"}]", "{\"a\": $b, $c: 4, 5}"]),
            parsed(&["label: \"x\"", "0: 7"]),
        ];
        for sample in samples {
            assert_eq!(ArgumentIterator::create(sample.to_array()), sample);
        }
    }

    #[test]
    fn test_positions_are_not_keys() {
        let positional = parsed(&["7"]);
        let keyed = parsed(&["0: 7"]);
        assert_ne!(positional, keyed);
        assert_eq!(positional.to_array()[0].0, RawKey::Position(0));
        assert_eq!(keyed.to_array()[0].0, RawKey::Scalar(Value::Int(0)));
    }

    #[test]
    fn test_raw_from_value() {
        let raw = RawArgument::from(Value::from(json!({"a": [1, 2]})));
        let created = ArgumentIterator::create(vec![(RawKey::Position(0), raw)]);
        let nested = match &created.get(0).unwrap().value {
            ArgumentValue::List(nested) => nested.clone(),
            other => panic!("expected list, got {:?}", other),
        };
        assert!(nested.get_by_key(&Value::from("a")).is_some());
    }

    #[test]
    fn test_merge_replaces_keyed_items() {
        let mut base = parsed(&["a: 1", "2"]);
        base.merge(parsed(&["a: 3", "4"]));
        assert_eq!(base.len(), 3);
        assert_eq!(
            base.get_by_key(&Value::from("a")).map(|arg| &arg.value),
            Some(&ArgumentValue::Scalar(Value::Int(3)))
        );
    }

    #[test]
    fn test_filter_and_walk() {
        let args = parsed(&["[1, $x]", "$y", "3"]);
        let extractions = args.filter(|arg| matches!(arg.value, ArgumentValue::Extraction(_)));
        assert_eq!(extractions.len(), 1);

        let mut seen = 0;
        args.walk(&mut |_: &Argument| seen += 1);
        assert_eq!(seen, 5);
    }
}
