use super::{Value, ValueMap};

/// Side-channel key/value store passed next to the payload.
///
/// Stages read it through `$key::path` extractions; it is never mutated
/// during execution. `Iterate` derives scoped copies with [`Context::with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: ValueMap,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a map value; `null` gives an empty context.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(values) => Some(Self { values }),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key, value);
    }

    /// A copy of this context with one extra (or replaced) entry.
    pub fn with(&self, key: impl Into<String>, value: Value) -> Self {
        let mut scoped = self.clone();
        scoped.insert(key, value);
        scoped
    }

    /// Copy every entry of `other` into this context; `other` wins on conflicts.
    pub fn merge(&mut self, other: Context) {
        for (key, value) in other.values {
            self.values.insert(key, value);
        }
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }
}

impl From<ValueMap> for Context {
    fn from(values: ValueMap) -> Self {
        Self { values }
    }
}
