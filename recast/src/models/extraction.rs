use serde::Serialize;

use super::transformation::TransformationIterator;
use crate::catalog::Registry;
use crate::error::{PipelineError, RegistryError};
use crate::extractor;
use crate::value::{Context, Value};

/// A deferred read: an accessor plus an optional chain applied to what it reads.
///
/// Resolving the same extraction twice against the same payload and context
/// gives the same result; the descriptor never stores what it resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    accessor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transformations: Option<TransformationIterator>,
}

impl Extraction {
    pub fn new(accessor: impl Into<String>) -> Self {
        Self {
            accessor: accessor.into(),
            transformations: None,
        }
    }

    pub fn with_transformations(
        accessor: impl Into<String>,
        transformations: Option<TransformationIterator>,
    ) -> Self {
        Self {
            accessor: accessor.into(),
            transformations,
        }
    }

    pub fn accessor(&self) -> &str {
        &self.accessor
    }

    pub fn transformations(&self) -> Option<&TransformationIterator> {
        self.transformations.as_ref()
    }

    pub fn bind(&mut self, registry: &Registry) -> Result<(), RegistryError> {
        match &mut self.transformations {
            Some(chain) => chain.bind(registry),
            None => Ok(()),
        }
    }

    /// Read the accessor out of `payload` and run the chain over the result.
    pub fn resolve(&self, payload: &Value, context: &Context) -> Result<Value, PipelineError> {
        let extracted = extractor::extract(payload, &self.accessor, context)?;
        match &self.transformations {
            Some(chain) => chain.apply(extracted, context),
            None => Ok(extracted),
        }
    }
}
