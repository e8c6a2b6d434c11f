use std::sync::Arc;

use crate::error::{BuildError, BuildResult, StageResult};
use crate::value::{Context, RecordObject, Value, ValueMap};

use super::{replayable, Stage};

/// Builds a record from named child stages, each run on the same payload.
///
/// Fields come out in registration order. The record is a map unless
/// [`CreateRecord::as_object`] asks for an object of a given class.
#[derive(Debug, Default)]
pub struct CreateRecord {
    fields: Vec<(String, Box<dyn Stage>)>,
    object_class: Option<String>,
}

impl CreateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_object(mut self, class: impl Into<String>) -> Self {
        self.object_class = Some(class.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, stage: impl Stage + 'static) -> BuildResult<Self> {
        self.add_stage(Box::new(stage), Some(name.into()))?;
        Ok(self)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Stage for CreateRecord {
    fn execute(&self, payload: Value, context: &Context) -> StageResult<Value> {
        let payload = replayable(payload, self.fields.len())?;
        let mut record = ValueMap::with_capacity(self.fields.len());
        for (name, stage) in &self.fields {
            record.insert(name.as_str(), stage.execute(payload.clone(), context)?);
        }
        Ok(match &self.object_class {
            Some(class) => Value::Object(Arc::new(RecordObject::new(class.as_str(), record))),
            None => Value::Map(record),
        })
    }

    fn add_stage(&mut self, stage: Box<dyn Stage>, identifier: Option<String>) -> BuildResult<()> {
        let name = identifier.ok_or(BuildError::MissingIdentifier)?;
        if self.fields.iter().any(|(existing, _)| *existing == name) {
            return Err(BuildError::DuplicateIdentifier(name));
        }
        self.fields.push((name, stage));
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "CreateRecord"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::extractor::extract;
    use crate::pipeline::testing::{increment, reject, Constant};
    use crate::pipeline::{Iterate, Pipeline};
    use crate::value::PayloadStream;
    use serde_json::json;

    #[test]
    fn test_fields_in_registration_order() {
        let record = CreateRecord::new()
            .with_field("b", Constant(Value::Int(2)))
            .unwrap()
            .with_field("a", Constant(Value::Int(1)))
            .unwrap();
        let out = record.execute(Value::Null, &Context::new()).unwrap();
        let keys: Vec<&str> = out.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(out, Value::from(json!({"b": 2, "a": 1})));
    }

    #[test]
    fn test_children_see_the_same_payload() {
        let record = CreateRecord::new()
            .with_field("a", Pipeline::new().with_stage(increment()))
            .unwrap()
            .with_field("b", Pipeline::new().with_stage(increment()).with_stage(increment()))
            .unwrap();
        let out = record.execute(Value::Int(10), &Context::new()).unwrap();
        assert_eq!(out, Value::from(json!({"a": 11, "b": 12})));
    }

    #[test]
    fn test_object_shape() {
        let record = CreateRecord::new()
            .as_object("Order")
            .with_field("total", Constant(Value::Int(42)))
            .unwrap();
        let out = record.execute(Value::Null, &Context::new()).unwrap();
        match &out {
            Value::Object(object) => assert_eq!(object.class_name(), "Order"),
            other => panic!("expected an object, got {:?}", other),
        }
        assert_eq!(extract(&out, "getTotal()", &Context::new()).unwrap(), Value::Int(42));
        assert_eq!(extract(&out, "total", &Context::new()).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_identifiers_are_required_and_unique() {
        let mut record = CreateRecord::new();
        assert!(matches!(
            record.add_stage(Box::new(increment()), None),
            Err(BuildError::MissingIdentifier)
        ));
        record.add_stage(Box::new(increment()), Some("x".into())).unwrap();
        assert!(matches!(
            record.add_stage(Box::new(increment()), Some("x".into())),
            Err(BuildError::DuplicateIdentifier(_))
        ));
        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_any_failing_child_fails_the_record() {
        let record = CreateRecord::new()
            .with_field("ok", Constant(Value::Int(1)))
            .unwrap()
            .with_field("bad", reject())
            .unwrap();
        assert!(matches!(
            record.execute(Value::Null, &Context::new()),
            Err(PipelineError::Validation(_))
        ));
    }

    #[test]
    fn test_stream_payload_reaches_every_field() {
        let record = CreateRecord::new()
            .with_field("next", Iterate::new().with_stage(increment()))
            .unwrap()
            .with_field("same", Iterate::new())
            .unwrap();
        let stream = PayloadStream::new(vec![Value::Int(1), Value::Int(2)]);

        let out = record.execute(Value::Stream(stream), &Context::new()).unwrap();
        assert_eq!(out, Value::from(json!({"next": [2, 3], "same": [1, 2]})));
    }
}
