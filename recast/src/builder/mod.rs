//! Pipelines from YAML or JSON definitions.
//!
//! The builder produces exactly what hand-written code produces with the
//! stage constructors and [`Stage::add_stage`], so both can be mixed freely.

mod definition;

pub use definition::{
    CreateRecordDefinition, FieldList, IterateDefinition, NamespaceDefinition, PipelineDefinition,
    StageDefinition,
};

use std::path::Path;

use crate::catalog::Registry;
use crate::error::{BuildError, BuildResult};
use crate::logs::log_info;
use crate::pipeline::{
    CreateRecord, ExtractStage, Fallback, Iterate, Pipeline, Stage, TransformStage, ValidateStage,
};

/// Builds [`Pipeline`]s from definitions, resolving names through a registry.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    registry: Registry,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new(Registry::with_defaults())
    }
}

impl PipelineBuilder {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Build the stage tree of `definition`.
    ///
    /// Namespaces declared by the definition apply to this build only.
    pub fn build(&self, definition: &PipelineDefinition) -> BuildResult<Pipeline> {
        let scoped;
        let registry = if definition.namespaces.is_empty() {
            &self.registry
        } else {
            let mut registry = self.registry.clone();
            for namespace in &definition.namespaces {
                registry.add_namespace(namespace.name.as_str(), namespace.priority);
            }
            scoped = registry;
            &scoped
        };

        let mut pipeline = Pipeline::new();
        add_stages(registry, &definition.stages, &mut pipeline)?;
        log_info(format!("Built pipeline with {} stages", definition.stage_count()));
        Ok(pipeline)
    }
}

fn add_stages(registry: &Registry, stages: &[StageDefinition], parent: &mut dyn Stage) -> BuildResult<()> {
    for stage in stages {
        parent.add_stage(build_stage(registry, stage)?, None)?;
    }
    Ok(())
}

fn build_pipeline(registry: &Registry, stages: &[StageDefinition]) -> BuildResult<Pipeline> {
    let mut pipeline = Pipeline::new();
    add_stages(registry, stages, &mut pipeline)?;
    Ok(pipeline)
}

fn build_stage(registry: &Registry, definition: &StageDefinition) -> BuildResult<Box<dyn Stage>> {
    Ok(match definition {
        StageDefinition::Extract(expression) => Box::new(ExtractStage::build(expression, registry)?),
        StageDefinition::Transform(chain) => Box::new(TransformStage::parse(chain, registry)?),
        StageDefinition::Validate(chain) => Box::new(ValidateStage::parse(chain, registry)?),
        StageDefinition::Pipeline(stages) => Box::new(build_pipeline(registry, stages)?),
        StageDefinition::Iterate(def) => {
            let mut iterate = match &def.context_key {
                Some(key) => Iterate::new().with_item_context_key(key.as_str()),
                None => Iterate::new(),
            };
            add_stages(registry, &def.stages, &mut iterate)?;
            Box::new(iterate)
        }
        StageDefinition::CreateRecord(def) => {
            if def.fields.is_empty() {
                return Err(BuildError::Definition("create_record needs at least one field".into()));
            }
            let mut record = match &def.object {
                Some(class) => CreateRecord::new().as_object(class.as_str()),
                None => CreateRecord::new(),
            };
            for (name, stages) in def.fields.iter() {
                record.add_stage(Box::new(build_pipeline(registry, stages)?), Some(name.to_string()))?;
            }
            Box::new(record)
        }
        StageDefinition::Fallback(branches) => {
            let mut fallback = Fallback::new();
            for branch in branches {
                fallback.add_stage(Box::new(build_pipeline(registry, branch)?), None)?;
            }
            Box::new(fallback)
        }
    })
}

/// Read a definition file: YAML for `.yaml`/`.yml`, JSON for `.json`, sniffed otherwise.
pub fn load_definition(path: &Path) -> BuildResult<PipelineDefinition> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let definition = match extension.as_deref() {
        Some("yaml") | Some("yml") => PipelineDefinition::from_yaml(&content)?,
        Some("json") => PipelineDefinition::from_json(&content)?,
        _ if content.trim_start().starts_with('{') => PipelineDefinition::from_json(&content)?,
        _ => PipelineDefinition::from_yaml(&content)?,
    };
    log_info(format!("Loaded definition {}", path.display()));
    Ok(definition)
}

/// A small, complete definition, printed by `recast example`.
pub fn example_definition() -> &'static str {
    EXAMPLE_DEFINITION
}

const EXAMPLE_DEFINITION: &str = r#"version: "1.0"
description: Normalise catalog rows into product records

context:
  config:
    currency: EUR
    skuPrefix: "SKU-"
    defaultPrice: 0

stages:
  - iterate:
      context_key: row
      stages:
        - create_record:
            fields:
              sku:
                - extract: $sku|Trim|Uppercase|EnsurePrefix($config::skuPrefix)
                - validate: MatchesRegex("/^SKU-[A-Z0-9-]+$/")
              title:
                - extract: title
                - transform: Trim
                - validate: IsNotEmpty|Length(1, 120)
              price:
                - fallback:
                    - - extract: price
                      - transform: Replace(",", ".")|ToNumber
                      - validate: IsNumeric
                    - - extract: $config::defaultPrice
              currency:
                - extract: $config::currency
              available:
                - extract: $stock|ToBoolean
"#;
