//! # Recast - declarative record pipelines
//!
//! Recast reads heterogeneous records (JSON, JSON Lines, CSV) and reshapes them
//! with pipelines of extract, transform and validate stages, configured in code
//! or in YAML/JSON definitions using a compact chaining DSL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Definition  │────▶│   Builder   │────▶│  Pipeline   │────▶│   Result    │
//! │ (YAML/JSON) │     │ (DSL+names) │     │  (stages)   │     │ (envelope)  │
//! └─────────────┘     └─────────────┘     └──────▲──────┘     └─────────────┘
//!                                                │
//!                     ┌─────────────┐     ┌──────┴──────┐
//!                     │ Input file  │────▶│   Source    │
//!                     │ (json/csv)  │     │ (list/lazy) │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use recast::{extract, Context, Value};
//! use serde_json::json;
//!
//! let order = Value::from(json!({"lines": [{"sku": "A-1"}]}));
//! let sku = extract(&order, "lines.0.sku", &Context::new()).unwrap();
//! assert_eq!(sku, Value::from("A-1"));
//! ```
//!
//! ```
//! use recast::dsl::split_commands;
//!
//! let commands = split_commands(r#"Trim|Replace("-", "_")"#).unwrap();
//! assert_eq!(commands.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`value`] - Payload and context values
//! - [`models`] - Parsed DSL items: arguments, extractions, transformations, validations
//! - [`dsl`] - Splitters, argument converter and syntax parser
//! - [`extractor`] - Accessor resolution
//! - [`catalog`] - Transformer/validator traits, bundled units and the registry
//! - [`pipeline`] - Stage contract and composite stages
//! - [`builder`] - Pipelines from definitions
//! - [`source`] - Input files as payloads
//! - [`runner`] - High-level file-to-result API
//! - [`logs`] - Log broadcasting

// Core modules
pub mod error;
pub mod value;
pub mod models;

// DSL
pub mod dsl;
pub mod extractor;

// Units
pub mod catalog;

// Runtime
pub mod pipeline;
pub mod builder;

// I/O
pub mod source;
pub mod runner;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    BuildError,
    ExtractionError,
    PipelineError,
    RegistryError,
    RunError,
    SourceError,
    SyntaxError,
    TransformationError,
    ValidationError,
};

// =============================================================================
// Re-exports - Values
// =============================================================================

pub use value::{Context, PayloadStream, RecordObject, Value, ValueMap};

// =============================================================================
// Re-exports - DSL
// =============================================================================

pub use dsl::{parse, parse_transformations, parse_validations};
pub use extractor::extract;

// =============================================================================
// Re-exports - Units
// =============================================================================

pub use catalog::{Arguments, Registry, Transformer, Validator};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    CreateRecord,
    ExtractStage,
    Fallback,
    Iterate,
    Pipeline,
    PipelineResult,
    Stage,
    TransformStage,
    ValidateStage,
};

pub use builder::{example_definition, load_definition, PipelineBuilder, PipelineDefinition, StageDefinition};

// =============================================================================
// Re-exports - Running
// =============================================================================

pub use runner::{run_files, RunOptions, RunReport};
pub use source::{read_input, InputFormat, InputInfo};
