//! Error types for the recast pipeline framework.
//!
//! The hierarchy mirrors the life of a pipeline:
//!
//! - [`SyntaxError`] - malformed DSL text (build time)
//! - [`ExtractionError`] - an accessor segment that cannot be resolved
//! - [`TransformationError`] - a transformer rejected its input or arguments
//! - [`ValidationError`] - a validator rejected the payload
//! - [`PipelineError`] - everything a running stage can raise
//! - [`RegistryError`] / [`BuildError`] - constructing pipelines
//! - [`SourceError`] - reading input records
//! - [`RunError`] - top-level orchestration
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::value::Value;

// =============================================================================
// DSL Syntax Errors
// =============================================================================

/// Malformed DSL input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    /// A `"` was opened and never closed.
    #[error("Unclosed string in '{input}'")]
    UnclosedString { input: String },

    /// One or more `(`, `[` or `{` were never closed.
    #[error("{count} unclosed '{token}' in '{input}'")]
    UnclosedToken { token: char, count: usize, input: String },

    /// A closing token without its opening counterpart, or a stray character.
    #[error("Unexpected '{token}' at index {index} in '{input}'")]
    UnexpectedToken { token: char, index: usize, input: String },

    /// A command name contains a character outside `[A-Za-z0-9_\\]`.
    #[error("Invalid character '{character}' in command name at index {index} of '{input}'")]
    InvalidCommandName { character: char, index: usize, input: String },

    /// `Trim||Lowercase`, `Trim|` and similar.
    #[error("Empty command at index {index} of '{input}'")]
    EmptyCommand { index: usize, input: String },

    /// A bare token that is neither a keyword nor a number.
    #[error("Could not parse argument '{0}'")]
    InvalidArgument(String),
}

// =============================================================================
// Extraction Errors
// =============================================================================

/// An accessor could not be resolved against a payload/context pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("Missing key '{segment}' while extracting '{accessor}'")]
    MissingKey { accessor: String, segment: String },

    #[error("Missing method '{segment}' while extracting '{accessor}'")]
    MissingMethod { accessor: String, segment: String },

    /// Property access over a list of non-scalar items.
    #[error("Ambiguous property '{segment}' over a list while extracting '{accessor}'")]
    Ambiguous { accessor: String, segment: String },

    #[error("Cannot resolve '{segment}' on a {found} value while extracting '{accessor}'")]
    TypeMismatch {
        accessor: String,
        segment: String,
        found: &'static str,
    },

    #[error("Missing context key '{segment}' while extracting '{accessor}'")]
    MissingContextKey { accessor: String, segment: String },
}

impl ExtractionError {
    /// The accessor that failed.
    pub fn accessor(&self) -> &str {
        match self {
            Self::MissingKey { accessor, .. }
            | Self::MissingMethod { accessor, .. }
            | Self::Ambiguous { accessor, .. }
            | Self::TypeMismatch { accessor, .. }
            | Self::MissingContextKey { accessor, .. } => accessor,
        }
    }

    /// The segment of the accessor that could not be resolved.
    pub fn segment(&self) -> &str {
        match self {
            Self::MissingKey { segment, .. }
            | Self::MissingMethod { segment, .. }
            | Self::Ambiguous { segment, .. }
            | Self::TypeMismatch { segment, .. }
            | Self::MissingContextKey { segment, .. } => segment,
        }
    }
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised by a transformer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformationError {
    #[error("{transformer}: invalid input type, {message}")]
    InvalidInputType { transformer: String, message: String },

    #[error("{transformer}: invalid argument, {message}")]
    InvalidArgument { transformer: String, message: String },

    #[error("{transformer}: {message}")]
    Failed { transformer: String, message: String },
}

impl TransformationError {
    pub fn invalid_input(transformer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInputType {
            transformer: transformer.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(transformer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            transformer: transformer.into(),
            message: message.into(),
        }
    }

    pub fn failed(transformer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            transformer: transformer.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised by a validator.
///
/// `Failed` and `InvalidInputType` carry the list of human readable messages
/// and the offending value so callers can report without re-running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{validator} failed: {}", .messages.join("; "))]
    Failed {
        validator: String,
        messages: Vec<String>,
        data: Option<Value>,
    },

    #[error("{validator}: invalid input type, {}", .messages.join("; "))]
    InvalidInputType {
        validator: String,
        messages: Vec<String>,
        data: Option<Value>,
    },

    #[error("{validator}: invalid argument, {message}")]
    InvalidArgument { validator: String, message: String },
}

impl ValidationError {
    pub fn failed(validator: impl Into<String>, message: impl Into<String>, data: &Value) -> Self {
        Self::Failed {
            validator: validator.into(),
            messages: vec![message.into()],
            data: Some(data.clone()),
        }
    }

    pub fn invalid_input(validator: impl Into<String>, message: impl Into<String>, data: &Value) -> Self {
        Self::InvalidInputType {
            validator: validator.into(),
            messages: vec![message.into()],
            data: Some(data.clone()),
        }
    }

    pub fn invalid_argument(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            validator: validator.into(),
            message: message.into(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Failed { messages, .. } | Self::InvalidInputType { messages, .. } => messages.clone(),
            Self::InvalidArgument { message, .. } => vec![message.clone()],
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Failed { data, .. } | Self::InvalidInputType { data, .. } => data.as_ref(),
            Self::InvalidArgument { .. } => None,
        }
    }
}

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading input records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: invalid CSV, {message}")]
    Csv { line: u64, message: String },

    #[error("Line {line}: invalid JSON, {message}")]
    Json { line: usize, message: String },

    #[error("Input is empty")]
    Empty,

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

// =============================================================================
// Pipeline Errors (execution time)
// =============================================================================

/// Everything a stage can raise while executing.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Transformation error: {0}")]
    Transformation(#[from] TransformationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A transformation or validation was executed before being bound to a registry.
    #[error("'{0}' was executed without being bound to a registry")]
    Unbound(String),
}

impl PipelineError {
    /// Only extraction, transformation and validation failures can be recovered by a fallback.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Extraction(_) | Self::Transformation(_) | Self::Validation(_)
        )
    }

    /// Flattened human readable messages, one per validation message.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(
                err @ (ValidationError::Failed { .. } | ValidationError::InvalidInputType { .. }),
            ) => err.messages(),
            other => vec![other.to_string()],
        }
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors from the transformer/validator registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Transformer '{0}' is already registered")]
    TransformerExists(String),

    #[error("Validator '{0}' is already registered")]
    ValidatorExists(String),

    #[error("Unknown transformer '{0}'")]
    UnknownTransformer(String),

    #[error("Unknown validator '{0}'")]
    UnknownValidator(String),
}

// =============================================================================
// Build Errors
// =============================================================================

/// Errors while assembling a stage tree, by hand or from a definition file.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// `add_stage` called on a stage that has no children.
    #[error("{0} stage does not accept child stages")]
    LeafStage(&'static str),

    #[error("CreateRecord fields require an identifier")]
    MissingIdentifier,

    #[error("Duplicate stage identifier '{0}'")]
    DuplicateIdentifier(String),

    #[error("Invalid pipeline definition: {0}")]
    Definition(String),

    #[error("Failed to read pipeline definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the error type returned by [`crate::runner::run_files`].
/// A payload that fails inside the pipeline is not an error here: it is
/// reported through [`crate::pipeline::PipelineResult`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Context must be a map, got {0}")]
    InvalidContext(&'static str),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for DSL parsing.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Result type for accessor resolution.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Result type for stage execution.
pub type StageResult<T> = Result<T, PipelineError>;

/// Result type for pipeline construction.
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type for input reading.
pub type SourceResult<T> = Result<T, SourceError>;
