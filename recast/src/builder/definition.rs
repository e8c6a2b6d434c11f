//! Serializable pipeline definitions, written in YAML or JSON.
//!
//! ```yaml
//! version: "1.0"
//! context:
//!   config: { prependString: Foo }
//! stages:
//!   - extract: foo
//!   - transform: Trim|Prepend(" - ", $config::prependString)
//!   - validate: IsNotEmpty
//! ```
//!
//! Each stage is a single-key map naming its kind.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::value::Value;

fn default_version() -> String {
    "1.0".to_string()
}

/// A whole pipeline file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Namespaces searched for unqualified unit names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<NamespaceDefinition>,

    /// Initial context, reachable as `$key::path`
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub context: Value,

    pub stages: Vec<StageDefinition>,
}

impl PipelineDefinition {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Number of stages, nested ones included.
    pub fn stage_count(&self) -> usize {
        self.stages.iter().map(StageDefinition::stage_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDefinition {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IterateDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_key: Option<String>,
    pub stages: Vec<StageDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRecordDefinition {
    /// Object class; a plain map is built when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub fields: FieldList,
}

/// One stage of a definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawStage")]
pub enum StageDefinition {
    /// `accessor` or `$accessor|Chain(...)`
    Extract(String),
    Transform(String),
    Validate(String),
    Pipeline(Vec<StageDefinition>),
    Iterate(IterateDefinition),
    CreateRecord(CreateRecordDefinition),
    /// Branches tried in order
    Fallback(Vec<Vec<StageDefinition>>),
}

impl StageDefinition {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Extract(_) => "extract",
            Self::Transform(_) => "transform",
            Self::Validate(_) => "validate",
            Self::Pipeline(_) => "pipeline",
            Self::Iterate(_) => "iterate",
            Self::CreateRecord(_) => "create_record",
            Self::Fallback(_) => "fallback",
        }
    }

    fn stage_count(&self) -> usize {
        let nested = |stages: &[StageDefinition]| stages.iter().map(Self::stage_count).sum::<usize>();
        1 + match self {
            Self::Extract(_) | Self::Transform(_) | Self::Validate(_) => 0,
            Self::Pipeline(stages) => nested(stages),
            Self::Iterate(def) => nested(&def.stages),
            Self::CreateRecord(def) => def.fields.iter().map(|(_, stages)| nested(stages)).sum(),
            Self::Fallback(branches) => branches.iter().map(|b| nested(b)).sum(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStage {
    extract: Option<String>,
    transform: Option<String>,
    validate: Option<String>,
    pipeline: Option<Vec<StageDefinition>>,
    iterate: Option<IterateDefinition>,
    create_record: Option<CreateRecordDefinition>,
    fallback: Option<Vec<Vec<StageDefinition>>>,
}

impl TryFrom<RawStage> for StageDefinition {
    type Error = String;

    fn try_from(raw: RawStage) -> Result<Self, Self::Error> {
        let mut found: Vec<StageDefinition> = [
            raw.extract.map(Self::Extract),
            raw.transform.map(Self::Transform),
            raw.validate.map(Self::Validate),
            raw.pipeline.map(Self::Pipeline),
            raw.iterate.map(Self::Iterate),
            raw.create_record.map(Self::CreateRecord),
            raw.fallback.map(Self::Fallback),
        ]
        .into_iter()
        .flatten()
        .collect();

        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err("a stage needs one of extract, transform, validate, pipeline, iterate, create_record, fallback".into()),
            _ => {
                let kinds: Vec<&str> = found.iter().map(StageDefinition::kind).collect();
                Err(format!("a stage has exactly one kind, found {}", kinds.join(" and ")))
            }
        }
    }
}

impl Serialize for StageDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Extract(v) | Self::Transform(v) | Self::Validate(v) => map.serialize_entry(self.kind(), v)?,
            Self::Pipeline(v) => map.serialize_entry(self.kind(), v)?,
            Self::Iterate(v) => map.serialize_entry(self.kind(), v)?,
            Self::CreateRecord(v) => map.serialize_entry(self.kind(), v)?,
            Self::Fallback(v) => map.serialize_entry(self.kind(), v)?,
        }
        map.end()
    }
}

/// `CreateRecord` fields in the order they were written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList(pub Vec<(String, Vec<StageDefinition>)>);

impl FieldList {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[StageDefinition])> {
        self.0.iter().map(|(name, stages)| (name.as_str(), stages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FieldList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, stages) in &self.0 {
            map.serialize_entry(name, stages)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldListVisitor;

        impl<'de> Visitor<'de> for FieldListVisitor {
            type Value = FieldList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to stage lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldList, A::Error> {
                let mut fields: Vec<(String, Vec<StageDefinition>)> = Vec::new();
                while let Some((name, stages)) = access.next_entry::<String, Vec<StageDefinition>>()? {
                    if fields.iter().any(|(existing, _)| *existing == name) {
                        return Err(de::Error::custom(format!("duplicate field '{}'", name)));
                    }
                    fields.push((name, stages));
                }
                Ok(FieldList(fields))
            }
        }

        deserializer.deserialize_map(FieldListVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_YAML: &str = r#"
description: Orders to invoice lines
namespaces:
  - name: Acme
    priority: 10
context:
  config:
    currency: EUR
stages:
  - extract: lines
  - iterate:
      context_key: line
      stages:
        - create_record:
            object: InvoiceLine
            fields:
              sku:
                - extract: $sku|Trim|Uppercase
              qty:
                - fallback:
                    - - extract: quantity
                      - validate: IsNumeric
                    - - transform: Default(1)
              currency:
                - extract: $config::currency
"#;

    #[test]
    fn test_yaml_definition() {
        let definition = PipelineDefinition::from_yaml(ORDER_YAML).unwrap();
        assert_eq!(definition.version, "1.0");
        assert_eq!(definition.namespaces[0].priority, 10);
        assert_eq!(definition.stages.len(), 2);

        let iterate = match &definition.stages[1] {
            StageDefinition::Iterate(def) => def,
            other => panic!("expected iterate, got {:?}", other),
        };
        assert_eq!(iterate.context_key.as_deref(), Some("line"));
        let record = match &iterate.stages[0] {
            StageDefinition::CreateRecord(def) => def,
            other => panic!("expected create_record, got {:?}", other),
        };
        let names: Vec<&str> = record.fields.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["sku", "qty", "currency"]);
        assert_eq!(definition.stage_count(), 9);
    }

    #[test]
    fn test_json_round_trip_keeps_field_order() {
        let definition = PipelineDefinition::from_yaml(ORDER_YAML).unwrap();
        let json = serde_json::to_string(&definition).unwrap();
        let back = PipelineDefinition::from_json(&json).unwrap();
        assert_eq!(back, definition);
    }

    #[test]
    fn test_stage_needs_exactly_one_kind() {
        let err = PipelineDefinition::from_yaml("stages:\n  - extract: a\n    transform: Trim\n").unwrap_err();
        assert!(err.to_string().contains("exactly one kind"));
        assert!(PipelineDefinition::from_yaml("stages:\n  - {}\n").is_err());
        assert!(PipelineDefinition::from_yaml("stages:\n  - explode: a\n").is_err());
    }

    #[test]
    fn test_duplicate_fields_are_refused() {
        let json = r#"{"stages": [{"create_record": {"fields": {"a": [], "a": []}}}]}"#;
        assert!(PipelineDefinition::from_json(json).is_err());
    }
}
