use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::argument::ArgumentIterator;
use super::syntax::SyntaxItemIterator;
use crate::catalog::{resolve_arguments, Registry, Validator};
use crate::error::{PipelineError, RegistryError};
use crate::value::{Context, Value};

/// A named validator invocation. Same shape and binding rules as a transformation,
/// but it never changes the payload.
#[derive(Clone, Serialize)]
pub struct Validation {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<ArgumentIterator>,
    #[serde(skip)]
    handler: Option<Arc<dyn Validator>>,
}

impl Validation {
    pub fn new(name: impl Into<String>, arguments: Option<ArgumentIterator>) -> Self {
        Self {
            name: name.into(),
            arguments,
            handler: None,
        }
    }

    pub fn with_handler(handler: Arc<dyn Validator>, arguments: Option<ArgumentIterator>) -> Self {
        Self {
            name: handler.name().to_string(),
            arguments,
            handler: Some(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> Option<&ArgumentIterator> {
        self.arguments.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.handler.is_some()
    }

    pub fn bind(&mut self, registry: &Registry) -> Result<(), RegistryError> {
        self.handler = Some(registry.validator(&self.name)?);
        match &mut self.arguments {
            Some(arguments) => arguments.bind(registry),
            None => Ok(()),
        }
    }

    pub fn validate(&self, payload: &Value, context: &Context) -> Result<(), PipelineError> {
        let handler = self
            .handler
            .as_deref()
            .ok_or_else(|| PipelineError::Unbound(self.name.clone()))?;
        let arguments = resolve_arguments(self.arguments.as_ref(), payload, context)?;
        Ok(handler.validate(payload, &arguments, context)?)
    }
}

impl PartialEq for Validation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arguments == other.arguments
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Validations checked in order; the first failure stops the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationIterator {
    items: Vec<Validation>,
}

impl ValidationIterator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, validation: Validation) {
        self.items.push(validation);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Validation> {
        self.items.iter()
    }

    pub fn bind(&mut self, registry: &Registry) -> Result<(), RegistryError> {
        self.items.iter_mut().try_for_each(|item| item.bind(registry))
    }

    pub fn validate(&self, payload: &Value, context: &Context) -> Result<(), PipelineError> {
        self.items
            .iter()
            .try_for_each(|validation| validation.validate(payload, context))
    }
}

impl From<SyntaxItemIterator> for ValidationIterator {
    fn from(syntax: SyntaxItemIterator) -> Self {
        syntax
            .into_iter()
            .map(|item| Validation::new(item.command, item.arguments))
            .collect()
    }
}

impl FromIterator<Validation> for ValidationIterator {
    fn from_iter<I: IntoIterator<Item = Validation>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
