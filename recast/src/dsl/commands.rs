//! Splitting a DSL chain into `command(arguments)` pairs.

use serde::Serialize;

use crate::error::{SyntaxError, SyntaxResult};

/// One command of a chain with its raw, unsplit argument string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawCommand {
    pub command: String,
    pub arguments: String,
}

impl RawCommand {
    fn new(command: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: arguments.into(),
        }
    }
}

enum State {
    Name,
    Arguments,
    AfterArguments,
}

/// Split `Cmd1(args)|Cmd2|Cmd3(...)` into its commands, in pipe order.
///
/// Command names match `^[A-Za-z\\][A-Za-z0-9_\\]*$` (`\` separates namespaces).
/// Parentheses nest inside argument lists and quoted strings are opaque.
///
/// # Example
/// ```
/// use recast::dsl::split_commands;
///
/// let commands = split_commands(r#"Trim|Prepend(" - ", $config::bar)"#).unwrap();
/// assert_eq!(commands[0].command, "Trim");
/// assert_eq!(commands[1].arguments, r#"" - ", $config::bar"#);
/// ```
pub fn split_commands(raw: &str) -> SyntaxResult<Vec<RawCommand>> {
    let input = raw.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    if !input.contains('(') {
        return split_plain(input);
    }

    let mut commands = Vec::new();
    let mut state = State::Name;
    let mut name = String::new();
    let mut name_closed = false;
    let mut arguments = String::new();
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in input.char_indices() {
        match state {
            State::Name => match c {
                '|' => {
                    if name.is_empty() {
                        return Err(empty_command(index, input));
                    }
                    commands.push(RawCommand::new(std::mem::take(&mut name), ""));
                    name_closed = false;
                }
                '(' => {
                    if name.is_empty() {
                        return Err(empty_command(index, input));
                    }
                    depth = 1;
                    state = State::Arguments;
                }
                c if c.is_whitespace() => name_closed = !name.is_empty(),
                c if !name_closed && is_name_char(c, name.is_empty()) => name.push(c),
                c => return Err(invalid_name(c, index, input)),
            },
            State::Arguments => {
                if escaped {
                    escaped = false;
                    arguments.push(c);
                    continue;
                }
                match c {
                    '\\' if in_string => escaped = true,
                    '"' => in_string = !in_string,
                    _ if in_string => {}
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            commands.push(RawCommand::new(
                                std::mem::take(&mut name),
                                std::mem::take(&mut arguments).trim(),
                            ));
                            name_closed = false;
                            state = State::AfterArguments;
                            continue;
                        }
                    }
                    _ => {}
                }
                arguments.push(c);
            }
            State::AfterArguments => match c {
                '|' => state = State::Name,
                c if c.is_whitespace() => {}
                c => {
                    return Err(SyntaxError::UnexpectedToken {
                        token: c,
                        index,
                        input: input.to_string(),
                    })
                }
            },
        }
    }

    match state {
        State::Name if name.is_empty() => Err(empty_command(input.len(), input)),
        State::Name => {
            commands.push(RawCommand::new(name, ""));
            Ok(commands)
        }
        State::Arguments if in_string => Err(SyntaxError::UnclosedString {
            input: input.to_string(),
        }),
        State::Arguments => Err(SyntaxError::UnclosedToken {
            token: '(',
            count: depth,
            input: input.to_string(),
        }),
        State::AfterArguments => Ok(commands),
    }
}

/// Chains without any argument list: plain names separated by `|`.
fn split_plain(input: &str) -> SyntaxResult<Vec<RawCommand>> {
    let mut commands = Vec::new();
    let mut offset = 0;
    for piece in input.split('|') {
        let leading = piece.len() - piece.trim_start().len();
        let name = piece.trim();
        if name.is_empty() {
            return Err(empty_command(offset + leading, input));
        }
        for (i, c) in name.char_indices() {
            if !is_name_char(c, i == 0) {
                return Err(invalid_name(c, offset + leading + i, input));
            }
        }
        commands.push(RawCommand::new(name, ""));
        offset += piece.len() + 1;
    }
    Ok(commands)
}

fn is_name_char(c: char, first: bool) -> bool {
    if first {
        c.is_ascii_alphabetic() || c == '\\'
    } else {
        c.is_ascii_alphanumeric() || c == '_' || c == '\\'
    }
}

fn empty_command(index: usize, input: &str) -> SyntaxError {
    SyntaxError::EmptyCommand {
        index,
        input: input.to_string(),
    }
}

fn invalid_name(character: char, index: usize, input: &str) -> SyntaxError {
    SyntaxError::InvalidCommandName {
        character,
        index,
        input: input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &str) -> Vec<(String, String)> {
        split_commands(raw)
            .unwrap()
            .into_iter()
            .map(|c| (c.command, c.arguments))
            .collect()
    }

    #[test]
    fn test_plain_chain() {
        assert_eq!(
            pairs("Trim|Uppercase | Acme\\Slug"),
            vec![
                ("Trim".into(), "".into()),
                ("Uppercase".into(), "".into()),
                ("Acme\\Slug".into(), "".into()),
            ]
        );
        assert!(split_commands("").unwrap().is_empty());
    }

    #[test]
    fn test_arguments_and_nesting() {
        assert_eq!(
            pairs(r#"Trim|Prepend(" - ", $config::prependString)|Lowercase"#),
            vec![
                ("Trim".into(), "".into()),
                ("Prepend".into(), r#"" - ", $config::prependString"#.into()),
                ("Lowercase".into(), "".into()),
            ]
        );
        assert_eq!(
            pairs("Prepend($name|Replace(\"(\", \")\")|Trim)"),
            vec![("Prepend".into(), "$name|Replace(\"(\", \")\")|Trim".into())]
        );
        assert_eq!(pairs("Trim()"), vec![("Trim".into(), "".into())]);
    }

    #[test]
    fn test_pipes_inside_strings_and_arguments() {
        assert_eq!(
            pairs(r#"Split("|")|Join(", ")"#),
            vec![("Split".into(), r#""|""#.into()), ("Join".into(), r#"", ""#.into())]
        );
    }

    #[test]
    fn test_backslash_outside_strings_does_not_escape() {
        assert_eq!(
            pairs(r#"Append(\)|Trim"#),
            vec![("Append".into(), r#"\"#.into()), ("Trim".into(), "".into())]
        );
    }

    #[test]
    fn test_invalid_command_name_reports_index() {
        assert_eq!(
            split_commands("Trim|2Upper").unwrap_err(),
            SyntaxError::InvalidCommandName {
                character: '2',
                index: 5,
                input: "Trim|2Upper".into()
            }
        );
        assert!(matches!(
            split_commands("Tr-im(1)"),
            Err(SyntaxError::InvalidCommandName { character: '-', index: 2, .. })
        ));
        assert!(matches!(
            split_commands("Tr im(1)"),
            Err(SyntaxError::InvalidCommandName { character: 'i', index: 3, .. })
        ));
        assert!(matches!(
            split_commands("Tr im"),
            Err(SyntaxError::InvalidCommandName { character: ' ', index: 2, .. })
        ));
    }

    #[test]
    fn test_empty_commands() {
        assert!(matches!(split_commands("Trim|"), Err(SyntaxError::EmptyCommand { .. })));
        assert!(matches!(split_commands("Trim||Lowercase"), Err(SyntaxError::EmptyCommand { index: 5, .. })));
        assert!(matches!(split_commands("(1)"), Err(SyntaxError::EmptyCommand { index: 0, .. })));
        assert!(matches!(split_commands("Pad(1)|"), Err(SyntaxError::EmptyCommand { .. })));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            split_commands("Pad(Foo(1)").unwrap_err(),
            SyntaxError::UnclosedToken {
                token: '(',
                count: 1,
                input: "Pad(Foo(1)".into()
            }
        );
        assert!(matches!(
            split_commands(r#"Pad("1)"#),
            Err(SyntaxError::UnclosedString { .. })
        ));
        assert!(matches!(
            split_commands("Pad(1) Trim"),
            Err(SyntaxError::UnexpectedToken { token: 'T', .. })
        ));
    }
}
