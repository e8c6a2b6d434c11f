use std::fmt;

use super::{Value, ValueMap};

/// An opaque object the extractor can read from.
///
/// Properties are plain lookups (`order.id`), methods are zero-argument
/// calls (`order.getId()`). Returning `None` means "no such member".
pub trait ObjectHandle: Send + Sync + fmt::Debug {
    fn class_name(&self) -> &str;

    fn property(&self, name: &str) -> Option<Value>;

    fn call(&self, method: &str) -> Option<Value>;

    /// Serializable view of the object, if it has one.
    fn to_map(&self) -> Option<ValueMap> {
        None
    }
}

/// Object-shaped record produced by `CreateRecord` when a class is configured.
///
/// Fields are exposed as properties and through `getField()` style getters;
/// `toArray()` returns the whole record as a map.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordObject {
    class: String,
    fields: ValueMap,
}

impl RecordObject {
    pub fn new(class: impl Into<String>, fields: ValueMap) -> Self {
        Self {
            class: class.into(),
            fields,
        }
    }

    pub fn fields(&self) -> &ValueMap {
        &self.fields
    }

    fn getter_field(&self, method: &str) -> Option<&Value> {
        let name = method.strip_prefix("get").filter(|rest| !rest.is_empty())?;
        if let Some(value) = self.fields.get(name) {
            return Some(value);
        }
        let mut chars = name.chars();
        let first = chars.next()?;
        let camel: String = first.to_lowercase().chain(chars).collect();
        self.fields.get(&camel)
    }
}

impl ObjectHandle for RecordObject {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    fn call(&self, method: &str) -> Option<Value> {
        match method {
            "toArray" => Some(Value::Map(self.fields.clone())),
            _ => self.getter_field(method).cloned(),
        }
    }

    fn to_map(&self) -> Option<ValueMap> {
        Some(self.fields.clone())
    }
}
