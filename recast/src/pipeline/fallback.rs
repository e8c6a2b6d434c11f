use crate::error::{BuildResult, PipelineError, StageResult};
use crate::logs::log_warning_indent;
use crate::value::{Context, Value};

use super::{replayable, Stage};

/// Tries each branch in turn on the same payload; the first one to finish wins.
///
/// Extraction, transformation and validation failures move on to the next
/// branch. Anything else propagates at once. When every branch fails, the
/// last failure propagates. Without branches the payload is returned as is.
/// A stream payload is read once and each branch gets the same items.
#[derive(Debug, Default)]
pub struct Fallback {
    branches: Vec<Box<dyn Stage>>,
}

impl Fallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, stage: impl Stage + 'static) -> Self {
        self.branches.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl Stage for Fallback {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value> {
        let payload = replayable(payload, self.branches.len())?;
        let mut last_error: Option<PipelineError> = None;
        for (index, branch) in self.branches.iter().enumerate() {
            match branch.execute(payload.clone(), context) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_recoverable() => {
                    log_warning_indent(format!("Fallback branch {} failed: {}", index + 1, err), 1);
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        match last_error {
            Some(err) => Err(err),
            None => Ok(payload),
        }
    }

    /// Identifiers are ignored; branches keep insertion order.
    fn add_stage(&mut self, stage: Box<dyn Stage>, _identifier: Option<String>) -> BuildResult<()> {
        self.branches.push(stage);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "Fallback"
    }
}
