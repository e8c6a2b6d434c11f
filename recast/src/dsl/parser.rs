use super::arguments::split_arguments;
use super::commands::split_commands;
use super::converter::convert_argument;
use crate::error::SyntaxResult;
use crate::models::{
    ArgumentIterator, SyntaxItem, SyntaxItemIterator, TransformationIterator, ValidationIterator,
};

/// Parse a DSL chain into one [`SyntaxItem`] per command, in pipe order.
///
/// Commands without arguments, `Trim` as well as `Trim()`, get `arguments: None`.
pub fn parse(syntax: &str) -> SyntaxResult<SyntaxItemIterator> {
    split_commands(syntax)?
        .into_iter()
        .map(|raw| {
            let pieces = split_arguments(&raw.arguments)?;
            let arguments = if pieces.is_empty() {
                None
            } else {
                Some(
                    pieces
                        .iter()
                        .map(|piece| convert_argument(piece))
                        .collect::<SyntaxResult<ArgumentIterator>>()?,
                )
            };
            Ok(SyntaxItem::new(raw.command, arguments))
        })
        .collect()
}

/// Parse a chain of transformer invocations (unbound).
pub fn parse_transformations(syntax: &str) -> SyntaxResult<TransformationIterator> {
    parse(syntax).map(TransformationIterator::from)
}

/// Parse a chain of validator invocations (unbound).
pub fn parse_validations(syntax: &str) -> SyntaxResult<ValidationIterator> {
    parse(syntax).map(ValidationIterator::from)
}
