//! Value objects built by the DSL parser and read by the runtime.
//!
//! - [`Argument`] / [`ArgumentIterator`] - invocation arguments, possibly nested
//! - [`Extraction`] - deferred accessor read with an optional chain
//! - [`Transformation`] / [`Validation`] - named invocations and their chains
//! - [`SyntaxItem`] - one parsed DSL command
//!
//! All of them are created once at build time and only read afterwards.

mod argument;
mod extraction;
mod syntax;
mod transformation;
mod validation;

pub use argument::{Argument, ArgumentIterator, ArgumentKey, ArgumentValue, RawArgument, RawKey};
pub use extraction::Extraction;
pub use syntax::{SyntaxItem, SyntaxItemIterator};
pub use transformation::{Transformation, TransformationIterator};
pub use validation::{Validation, ValidationIterator};
