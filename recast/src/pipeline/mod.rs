//! The stage interpreter.
//!
//! Every node of a pipeline tree implements [`Stage`]. Leaves read
//! ([`ExtractStage`]), rewrite ([`TransformStage`]) or check
//! ([`ValidateStage`]) the payload; combinators arrange other stages:
//!
//! ```text
//! Pipeline      a -> s1 -> s2 -> ... -> out
//! Iterate       [a, b] -> [p(a), p(b)]
//! CreateRecord  a -> { k1: p1(a), k2: p2(a) }
//! Fallback      p1(a), else p2(a), else ...
//! ```
//!
//! Errors propagate up the tree. Only [`Fallback`] catches them, and only the
//! recoverable ones (extraction, transformation and validation).

mod create_record;
mod fallback;
mod iterate;
mod stages;

pub use create_record::CreateRecord;
pub use fallback::Fallback;
pub use iterate::Iterate;
pub use stages::{ExtractStage, TransformStage, ValidateStage};

use serde::Serialize;
use std::fmt;

use crate::error::{BuildError, BuildResult, StageResult};
use crate::value::{Context, Value};

/// A node of a pipeline tree.
pub trait Stage: Send + Sync + fmt::Debug {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value>;

    /// Attach a child. Only used while building; leaves refuse children.
    fn add_stage(&mut self, stage: Box<dyn Stage>, identifier: Option<String>) -> BuildResult<()> {
        let _ = (stage, identifier);
        Err(BuildError::LeafStage(self.kind()))
    }

    /// Short name of the stage type.
    fn kind(&self) -> &'static str;

    /// Execute without raising: failures become an unsuccessful [`PipelineResult`].
    fn process(&self, payload: Value, context: &Context) -> PipelineResult {
        match self.execute(payload, context) {
            Ok(payload) => PipelineResult::success(payload),
            Err(err) => PipelineResult::failure(err.messages()),
        }
    }
}

/// Outcome of [`Stage::process`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    pub payload: Value,
    pub messages: Vec<String>,
}

impl PipelineResult {
    pub fn success(payload: Value) -> Self {
        Self {
            success: true,
            payload,
            messages: Vec::new(),
        }
    }

    pub fn failure(messages: Vec<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            messages,
        }
    }
}

/// Drain a stream payload into a list when more than one child will read it.
///
/// A stream is single-pass, so children sharing it would each see what the
/// previous one left. Read errors propagate as
/// [`PipelineError::Source`](crate::error::PipelineError::Source).
pub(crate) fn replayable(payload: Value, readers: usize) -> StageResult<Value> {
    match payload {
        Value::Stream(stream) if readers > 1 => match stream.take() {
            Some(producer) => Ok(Value::List(producer.collect::<Result<Vec<_>, _>>()?)),
            None => Ok(Value::Stream(stream)),
        },
        other => Ok(other),
    }
}

/// Stages run one after the other, each output feeding the next stage.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<(Option<String>, Box<dyn Stage>)>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Stage::add_stage`] for anonymous stages.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push((None, Box::new(stage)));
        self
    }

    /// Stage registered under `identifier`.
    pub fn stage(&self, identifier: &str) -> Option<&dyn Stage> {
        self.stages
            .iter()
            .find(|(id, _)| id.as_deref() == Some(identifier))
            .map(|(_, stage)| stage.as_ref())
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().filter_map(|(id, _)| id.as_deref())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Stage for Pipeline {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value> {
        self.stages
            .iter()
            .try_fold(payload, |current, (_, stage)| stage.execute(current, context))
    }

    fn add_stage(&mut self, stage: Box<dyn Stage>, identifier: Option<String>) -> BuildResult<()> {
        if let Some(id) = &identifier {
            if self.stage(id).is_some() {
                return Err(BuildError::DuplicateIdentifier(id.clone()));
            }
        }
        self.stages.push((identifier, stage));
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "Pipeline"
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Small stages and transformers shared by the runtime tests.

    use super::*;
    use crate::catalog::{Arguments, Transformer, Validator};
    use crate::error::{PipelineError, TransformationError, ValidationError};
    use crate::models::{Transformation, TransformationIterator, Validation, ValidationIterator};
    use std::sync::Arc;

    /// Always returns the same value.
    #[derive(Debug)]
    pub struct Constant(pub Value);

    impl Stage for Constant {
        fn execute(&self, _: Value, _: &Context) -> StageResult<Value> {
            Ok(self.0.clone())
        }

        fn kind(&self) -> &'static str {
            "Constant"
        }
    }

    #[derive(Debug)]
    pub struct Increment;

    impl Transformer for Increment {
        fn name(&self) -> &'static str {
            "Increment"
        }

        fn transform(&self, payload: Value, _: &Arguments, _: &Context) -> Result<Value, TransformationError> {
            payload
                .as_i64()
                .map(|n| Value::Int(n + 1))
                .ok_or_else(|| TransformationError::invalid_input("Increment", payload.type_name()))
        }
    }

    #[derive(Debug)]
    pub struct Reject;

    impl Validator for Reject {
        fn name(&self) -> &'static str {
            "Reject"
        }

        fn validate(&self, payload: &Value, _: &Arguments, _: &Context) -> Result<(), ValidationError> {
            Err(ValidationError::failed("Reject", "always rejects", payload))
        }
    }

    pub fn increment() -> TransformStage {
        TransformStage::new(TransformationIterator::from_iter([Transformation::with_handler(
            Arc::new(Increment),
            None,
        )]))
    }

    pub fn reject() -> ValidateStage {
        ValidateStage::new(ValidationIterator::from_iter([Validation::with_handler(Arc::new(Reject), None)]))
    }

    /// Fails with a non-recoverable error.
    #[derive(Debug)]
    pub struct Broken;

    impl Stage for Broken {
        fn execute(&self, _: Value, _: &Context) -> StageResult<Value> {
            Err(PipelineError::Unbound("Broken".into()))
        }

        fn kind(&self) -> &'static str {
            "Broken"
        }
    }
}
