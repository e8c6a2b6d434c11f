use std::collections::HashMap;
use std::sync::Arc;

use super::{transformers, validators, Transformer, Validator};
use crate::error::RegistryError;

/// Name to unit lookup for transformers and validators.
///
/// Names may be qualified with `\`-separated namespaces. An unqualified name
/// is tried under each registered namespace, highest priority first, then
/// as-is. A leading `\` makes a name absolute.
///
/// Each name maps to a single shared instance.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    transformers: HashMap<String, Arc<dyn Transformer>>,
    validators: HashMap<String, Arc<dyn Validator>>,
    namespaces: Vec<(String, i32)>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every bundled transformer and validator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for transformer in transformers::defaults() {
            registry.transformers.insert(transformer.name().to_string(), transformer);
        }
        for validator in validators::defaults() {
            registry.validators.insert(validator.name().to_string(), validator);
        }
        registry
    }

    pub fn register_transformer(
        &mut self,
        name: impl Into<String>,
        transformer: Arc<dyn Transformer>,
    ) -> Result<(), RegistryError> {
        let name = normalize(&name.into());
        if self.transformers.contains_key(&name) {
            return Err(RegistryError::TransformerExists(name));
        }
        self.transformers.insert(name, transformer);
        Ok(())
    }

    /// Register or replace a transformer.
    pub fn override_transformer(&mut self, name: impl Into<String>, transformer: Arc<dyn Transformer>) {
        self.transformers.insert(normalize(&name.into()), transformer);
    }

    pub fn register_validator(
        &mut self,
        name: impl Into<String>,
        validator: Arc<dyn Validator>,
    ) -> Result<(), RegistryError> {
        let name = normalize(&name.into());
        if self.validators.contains_key(&name) {
            return Err(RegistryError::ValidatorExists(name));
        }
        self.validators.insert(name, validator);
        Ok(())
    }

    /// Register or replace a validator.
    pub fn override_validator(&mut self, name: impl Into<String>, validator: Arc<dyn Validator>) {
        self.validators.insert(normalize(&name.into()), validator);
    }

    /// Add a namespace searched for unqualified names. Higher priority wins;
    /// equal priorities keep insertion order.
    pub fn add_namespace(&mut self, namespace: impl Into<String>, priority: i32) {
        let namespace = normalize(&namespace.into());
        self.namespaces.retain(|(existing, _)| *existing != namespace);
        self.namespaces.push((namespace, priority));
        self.namespaces.sort_by(|a, b| b.1.cmp(&a.1));
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|(namespace, _)| namespace.as_str())
    }

    pub fn transformer(&self, name: &str) -> Result<Arc<dyn Transformer>, RegistryError> {
        self.candidates(name)
            .iter()
            .find_map(|candidate| self.transformers.get(candidate))
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTransformer(name.to_string()))
    }

    pub fn validator(&self, name: &str) -> Result<Arc<dyn Validator>, RegistryError> {
        self.candidates(name)
            .iter()
            .find_map(|candidate| self.validators.get(candidate))
            .cloned()
            .ok_or_else(|| RegistryError::UnknownValidator(name.to_string()))
    }

    /// Registered transformer names, sorted.
    pub fn transformer_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered validator names, sorted.
    pub fn validator_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn candidates(&self, name: &str) -> Vec<String> {
        if let Some(absolute) = name.strip_prefix('\\') {
            return vec![absolute.to_string()];
        }
        self.namespaces
            .iter()
            .map(|(namespace, _)| format!("{}\\{}", namespace, name))
            .chain(std::iter::once(name.to_string()))
            .collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_matches('\\').to_string()
}
