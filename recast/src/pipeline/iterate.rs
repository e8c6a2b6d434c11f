use crate::error::{BuildResult, StageResult, TransformationError};
use crate::logs::log_info_indent;
use crate::value::{Context, Value, ValueMap};

use super::{Pipeline, Stage};

/// Runs a child pipeline over every item of a list, map or stream.
///
/// Lists and streams come out as lists in input order; maps keep their keys.
/// A stream is pulled exactly once. With an item context key, each item is
/// also reachable from nested stages as `$key::...`.
#[derive(Debug, Default)]
pub struct Iterate {
    pipeline: Pipeline,
    item_context_key: Option<String>,
}

impl Iterate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item_context_key(mut self, key: impl Into<String>) -> Self {
        self.item_context_key = Some(key.into());
        self
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.pipeline = self.pipeline.with_stage(stage);
        self
    }

    pub fn item_context_key(&self) -> Option<&str> {
        self.item_context_key.as_deref()
    }

    fn run_item(&self, item: Value, context: &Context) -> StageResult<Value> {
        match &self.item_context_key {
            Some(key) => {
                let scoped = context.with(key.as_str(), item.clone());
                self.pipeline.execute(item, &scoped)
            }
            None => self.pipeline.execute(item, context),
        }
    }
}

impl Stage for Iterate {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value> {
        match payload {
            Value::List(items) => {
                log_info_indent(format!("Iterating over {} items", items.len()), 1);
                items
                    .into_iter()
                    .map(|item| self.run_item(item, context))
                    .collect::<StageResult<Vec<_>>>()
                    .map(Value::List)
            }
            Value::Map(map) => {
                log_info_indent(format!("Iterating over {} entries", map.len()), 1);
                map.into_iter()
                    .map(|(key, item)| self.run_item(item, context).map(|value| (key, value)))
                    .collect::<StageResult<ValueMap>>()
                    .map(Value::Map)
            }
            Value::Stream(stream) => {
                let producer = stream.take().ok_or_else(|| {
                    TransformationError::invalid_input("Iterate", "payload stream was already consumed")
                })?;
                let mut results = Vec::new();
                for item in producer {
                    results.push(self.run_item(item?, context)?);
                }
                log_info_indent(format!("Iterated over {} streamed items", results.len()), 1);
                Ok(Value::List(results))
            }
            other => Err(TransformationError::invalid_input(
                "Iterate",
                format!("expected a list, map or stream, got {}", other.type_name()),
            )
            .into()),
        }
    }

    fn add_stage(&mut self, stage: Box<dyn Stage>, identifier: Option<String>) -> BuildResult<()> {
        self.pipeline.add_stage(stage, identifier)
    }

    fn kind(&self) -> &'static str {
        "Iterate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Registry;
    use crate::error::{PipelineError, SourceError};
    use crate::pipeline::testing::{increment, reject};
    use crate::pipeline::{ExtractStage, TransformStage};
    use crate::value::PayloadStream;
    use serde_json::json;

    #[test]
    fn test_iterate_list() {
        let iterate = Iterate::new().with_stage(increment());
        let out = iterate.execute(Value::from(json!([1, 2, 3])), &Context::new()).unwrap();
        assert_eq!(out, Value::from(json!([2, 3, 4])));
    }

    #[test]
    fn test_iterate_stream_gives_same_result() {
        let iterate = Iterate::new().with_stage(increment());
        let stream = PayloadStream::new(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let out = iterate.execute(Value::Stream(stream.clone()), &Context::new()).unwrap();
        assert_eq!(out, Value::from(json!([2, 3, 4])));

        assert!(stream.is_consumed());
        assert!(matches!(
            iterate.execute(Value::Stream(stream), &Context::new()),
            Err(PipelineError::Transformation(TransformationError::InvalidInputType { .. }))
        ));
    }

    #[test]
    fn test_stream_read_errors_surface() {
        let iterate = Iterate::new().with_stage(increment());
        let items = vec![Ok(Value::Int(1)), Err(SourceError::Empty)];
        let stream = PayloadStream::fallible(items.into_iter());
        assert!(matches!(
            iterate.execute(Value::Stream(stream), &Context::new()),
            Err(PipelineError::Source(SourceError::Empty))
        ));
    }

    #[test]
    fn test_iterate_map_keeps_keys() {
        let iterate = Iterate::new().with_stage(increment());
        let out = iterate.execute(Value::from(json!({"b": 1, "a": 2})), &Context::new()).unwrap();
        assert_eq!(out, Value::from(json!({"b": 2, "a": 3})));
    }

    #[test]
    fn test_item_context_key_exposes_the_item() {
        let registry = Registry::with_defaults();
        let iterate = Iterate::new()
            .with_item_context_key("line")
            .with_stage(ExtractStage::build("sku", &registry).unwrap())
            .with_stage(TransformStage::parse(r#"Append("x", $line::qty)"#, &registry).unwrap());
        let payload = Value::from(json!([{"sku": "A", "qty": 2}, {"sku": "B", "qty": 5}]));
        let out = iterate.execute(payload, &Context::new()).unwrap();
        assert_eq!(out, Value::from(json!(["Ax2", "Bx5"])));
    }

    #[test]
    fn test_one_failure_aborts_everything() {
        let iterate = Iterate::new().with_stage(reject());
        assert!(matches!(
            iterate.execute(Value::from(json!([1, 2])), &Context::new()),
            Err(PipelineError::Validation(_))
        ));
        assert!(iterate.execute(Value::from("scalar"), &Context::new()).is_err());
    }
}
