//! The pipe-chain DSL.
//!
//! ```text
//! Trim|Prepend(" - ", $config::prependString)|MatchesRegex("/^Foo/")
//! └──┘ └─────────────────────────────────────┘
//! command      command(arguments)
//! ```
//!
//! Arguments are quoted strings, extractions (`$accessor` or
//! `$accessor|Chain(...)`), arrays, objects and bare scalars, all nestable.
//!
//! Parsing runs in layers:
//!
//! 1. [`split_commands`] - `Cmd(args)|Cmd2` into command/argument-string pairs
//! 2. [`split_arguments`] - an argument string into its top-level pieces
//! 3. [`convert_argument`] - one piece into a typed argument
//! 4. [`parse`] - all of the above into a [`crate::models::SyntaxItemIterator`]

mod arguments;
mod commands;
mod converter;
mod parser;

pub use arguments::{split_arguments, split_key_value};
pub use commands::{split_commands, RawCommand};
pub use converter::convert_argument;
pub use parser::{parse, parse_transformations, parse_validations};
