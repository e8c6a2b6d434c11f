use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::argument::ArgumentIterator;
use super::syntax::SyntaxItemIterator;
use crate::catalog::{apply_transformer, resolve_arguments, Registry, Transformer};
use crate::error::{PipelineError, RegistryError};
use crate::value::{Context, Value};

/// A named transformer invocation.
///
/// The name is resolved once, at build time, by [`Transformation::bind`];
/// executing an unbound invocation fails with [`PipelineError::Unbound`].
#[derive(Clone, Serialize)]
pub struct Transformation {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<ArgumentIterator>,
    #[serde(skip)]
    handler: Option<Arc<dyn Transformer>>,
}

impl Transformation {
    pub fn new(name: impl Into<String>, arguments: Option<ArgumentIterator>) -> Self {
        Self {
            name: name.into(),
            arguments,
            handler: None,
        }
    }

    /// An invocation already bound to `handler`, named after it.
    pub fn with_handler(handler: Arc<dyn Transformer>, arguments: Option<ArgumentIterator>) -> Self {
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
        self.handler = Some(registry.transformer(&self.name)?);
        match &mut self.arguments {
            Some(arguments) => arguments.bind(registry),
            None => Ok(()),
        }
    }

    /// Resolve the arguments against `payload` and transform it.
    pub fn apply(&self, payload: Value, context: &Context) -> Result<Value, PipelineError> {
        let handler = self
            .handler
            .as_deref()
            .ok_or_else(|| PipelineError::Unbound(self.name.clone()))?;
        let arguments = resolve_arguments(self.arguments.as_ref(), &payload, context)?;
        Ok(apply_transformer(handler, payload, &arguments, context, false)?)
    }
}

impl PartialEq for Transformation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arguments == other.arguments
    }
}

impl fmt::Debug for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformation")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Transformations applied one after the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransformationIterator {
    items: Vec<Transformation>,
}

impl TransformationIterator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transformation: Transformation) {
        self.items.push(transformation);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transformation> {
        self.items.iter()
    }

    pub fn bind(&mut self, registry: &Registry) -> Result<(), RegistryError> {
        self.items.iter_mut().try_for_each(|item| item.bind(registry))
    }

    /// Fold `payload` through every transformation in order.
    pub fn apply(&self, payload: Value, context: &Context) -> Result<Value, PipelineError> {
        self.items
            .iter()
            .try_fold(payload, |current, transformation| transformation.apply(current, context))
    }
}

impl From<SyntaxItemIterator> for TransformationIterator {
    fn from(syntax: SyntaxItemIterator) -> Self {
        syntax
            .into_iter()
            .map(|item| Transformation::new(item.command, item.arguments))
            .collect()
    }
}

impl FromIterator<Transformation> for TransformationIterator {
    fn from_iter<I: IntoIterator<Item = Transformation>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
