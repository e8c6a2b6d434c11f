//! High-level API: a definition file and an input file in, a report out.
//!
//! # Example
//!
//! ```rust,ignore
//! use recast::runner::{run_files, RunOptions};
//! use std::path::Path;
//!
//! let report = run_files(
//!     Path::new("pipeline.yaml"),
//!     Path::new("catalog.csv"),
//!     &RunOptions::default(),
//! )?;
//! println!("success: {}", report.result.success);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::builder::{load_definition, PipelineBuilder, PipelineDefinition};
use crate::error::RunError;
use crate::logs::{log_error, log_info, log_success};
use crate::pipeline::{PipelineResult, Stage};
use crate::source::{read_input, InputInfo};
use crate::value::{Context, Value, ValueMap};

/// Options for [`run_files`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Extra context, merged over the definition's own
    pub context: Option<Value>,

    /// Read JSON Lines and CSV input as a single-pass stream
    pub stream: bool,

    /// Expose environment variables as `$env::NAME`
    pub with_env: bool,
}

/// Outcome of [`run_files`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub result: PipelineResult,
    pub input: InputInfo,
    pub stage_count: usize,
}

/// Build the context for a run: definition context, then `options.context`, then `env`.
pub fn build_context(definition: &PipelineDefinition, options: &RunOptions) -> Result<Context, RunError> {
    let mut context = Context::from_value(definition.context.clone())
        .ok_or_else(|| RunError::InvalidContext(definition.context.type_name()))?;

    if let Some(extra) = &options.context {
        let extra = Context::from_value(extra.clone()).ok_or_else(|| RunError::InvalidContext(extra.type_name()))?;
        context.merge(extra);
    }

    if options.with_env {
        let env: ValueMap = std::env::vars().map(|(key, value)| (key, Value::String(value))).collect();
        context.insert("env", Value::Map(env));
    }
    Ok(context)
}

/// Build and execute `definition` against `payload`.
pub fn run_definition(
    definition: &PipelineDefinition,
    payload: Value,
    options: &RunOptions,
) -> Result<PipelineResult, RunError> {
    let pipeline = PipelineBuilder::default().build(definition)?;
    let context = build_context(definition, options)?;
    Ok(pipeline.process(payload, &context))
}

/// Load the definition at `definition_path`, read `input_path`, and run.
///
/// A payload that fails inside the pipeline gives an unsuccessful
/// [`PipelineResult`], not an error.
pub fn run_files(definition_path: &Path, input_path: &Path, options: &RunOptions) -> Result<RunReport, RunError> {
    let definition = load_definition(definition_path)?;

    log_info(format!("Reading {}", input_path.display()));
    let (payload, input) = read_input(input_path, options.stream)?;
    match input.records {
        Some(count) => log_info(format!("{} records ({:?})", count, input.format)),
        None => log_info(format!("Streaming records ({:?})", input.format)),
    }

    let result = run_definition(&definition, payload, options)?;
    if result.success {
        log_success("Pipeline completed");
    } else {
        log_error(format!("Pipeline failed: {}", result.messages.join("; ")));
    }

    Ok(RunReport {
        result,
        input,
        stage_count: definition.stage_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const PREPEND_PIPELINE: &str = r#"
context:
  config:
    prependString: Foo
stages:
  - extract: foo
  - transform: Trim|Prepend(" - ", $config::prependString)
  - validate: IsNotEmpty
  - validate: MatchesRegex("/^Foo -.*[^ ]$/")
"#;

    fn files(dir: &TempDir, definition: &str, input_name: &str, input: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let definition_path = dir.path().join("pipeline.yaml");
        let input_path = dir.path().join(input_name);
        std::fs::write(&definition_path, definition).unwrap();
        std::fs::write(&input_path, input).unwrap();
        (definition_path, input_path)
    }

    #[test]
    fn test_end_to_end_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let (definition, input) = files(&dir, PREPEND_PIPELINE, "input.json", r#"{"foo": " bar "}"#);

        let report = run_files(&definition, &input, &RunOptions::default()).unwrap();
        assert!(report.result.success, "{:?}", report.result.messages);
        assert_eq!(report.result.payload, Value::from("Foo - bar"));
        assert_eq!(report.stage_count, 4);
    }

    #[test]
    fn test_option_context_wins() {
        let dir = tempfile::tempdir().unwrap();
        let (definition, input) = files(&dir, PREPEND_PIPELINE, "input.json", r#"{"foo": "bar"}"#);
        let options = RunOptions {
            context: Some(Value::from(json!({"config": {"prependString": "Bar"}}))),
            ..RunOptions::default()
        };

        let report = run_files(&definition, &input, &options).unwrap();
        assert!(!report.result.success);
        assert_eq!(report.result.payload, Value::Null);
        assert!(report.result.messages[0].contains("does not match"));
    }

    #[test]
    fn test_streamed_csv_through_iterate() {
        let dir = tempfile::tempdir().unwrap();
        let definition = "stages:\n  - iterate:\n      stages:\n        - extract: $name|Trim|Uppercase\n";
        let (definition, input) = files(&dir, definition, "people.csv", "name;age\n ada ;36\ngrace;45\n");
        let options = RunOptions {
            stream: true,
            ..RunOptions::default()
        };

        let report = run_files(&definition, &input, &options).unwrap();
        assert_eq!(report.input.records, None);
        assert_eq!(report.result.payload, Value::from(json!(["ADA", "GRACE"])));
    }

    #[test]
    fn test_env_is_exposed_on_request() {
        std::env::set_var("RECAST_TEST_REGION", "eu-west");
        let definition = PipelineDefinition::from_yaml("stages:\n  - extract: $env::RECAST_TEST_REGION\n").unwrap();

        let without = run_definition(&definition, Value::Null, &RunOptions::default()).unwrap();
        assert!(!without.success);

        let options = RunOptions {
            with_env: true,
            ..RunOptions::default()
        };
        let with = run_definition(&definition, Value::Null, &options).unwrap();
        assert_eq!(with.payload, Value::from("eu-west"));
        std::env::remove_var("RECAST_TEST_REGION");
    }

    #[test]
    fn test_context_must_be_a_map() {
        let definition = PipelineDefinition::from_yaml("context: [1]\nstages: []\n").unwrap();
        assert!(matches!(
            build_context(&definition, &RunOptions::default()),
            Err(RunError::InvalidContext("list"))
        ));
    }
}
