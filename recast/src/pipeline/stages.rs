use crate::catalog::Registry;
use crate::dsl::{convert_argument, parse_transformations, parse_validations};
use crate::error::{BuildError, BuildResult, StageResult};
use crate::models::{ArgumentValue, Extraction, TransformationIterator, ValidationIterator};
use crate::value::{Context, Value};

use super::Stage;

/// Replaces the payload with what an extraction reads out of it.
#[derive(Debug, Clone)]
pub struct ExtractStage {
    extraction: Extraction,
}

impl ExtractStage {
    pub fn new(extraction: Extraction) -> Self {
        Self { extraction }
    }

    /// Build from `accessor` or `$accessor|Chain(...)`, bound against `registry`.
    pub fn build(expression: &str, registry: &Registry) -> BuildResult<Self> {
        let expression = expression.trim();
        let mut extraction = if expression.starts_with('$') {
            let argument = convert_argument(expression)?;
            match (argument.key, argument.value) {
                (None, ArgumentValue::Extraction(extraction)) => extraction,
                _ => {
                    return Err(BuildError::Definition(format!(
                        "'{}' is not an extraction",
                        expression
                    )))
                }
            }
        } else {
            Extraction::new(expression)
        };
        extraction.bind(registry)?;
        Ok(Self::new(extraction))
    }

    pub fn extraction(&self) -> &Extraction {
        &self.extraction
    }
}

impl Stage for ExtractStage {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value> {
        self.extraction.resolve(&payload, context)
    }

    fn kind(&self) -> &'static str {
        "Extract"
    }
}

/// Runs a transformation chain over the payload.
#[derive(Debug, Clone)]
pub struct TransformStage {
    transformations: TransformationIterator,
}

impl TransformStage {
    pub fn new(transformations: TransformationIterator) -> Self {
        Self { transformations }
    }

    /// Parse a DSL chain and bind every name in it.
    pub fn parse(chain: &str, registry: &Registry) -> BuildResult<Self> {
        let mut transformations = parse_transformations(chain)?;
        transformations.bind(registry)?;
        Ok(Self::new(transformations))
    }

    pub fn transformations(&self) -> &TransformationIterator {
        &self.transformations
    }
}

impl Stage for TransformStage {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value> {
        self.transformations.apply(payload, context)
    }

    fn kind(&self) -> &'static str {
        "Transform"
    }
}

/// Checks the payload and passes it on untouched.
#[derive(Debug, Clone)]
pub struct ValidateStage {
    validations: ValidationIterator,
}

impl ValidateStage {
    pub fn new(validations: ValidationIterator) -> Self {
        Self { validations }
    }

    pub fn parse(chain: &str, registry: &Registry) -> BuildResult<Self> {
        let mut validations = parse_validations(chain)?;
        validations.bind(registry)?;
        Ok(Self::new(validations))
    }

    pub fn validations(&self) -> &ValidationIterator {
        &self.validations
    }
}

impl Stage for ValidateStage {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value> {
        self.validations.validate(&payload, context)?;
        Ok(payload)
    }

    fn kind(&self) -> &'static str {
        "Validate"
    }
}
