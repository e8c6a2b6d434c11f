//! Depth-aware splitting of argument lists and `key: value` pairs.

use crate::error::{SyntaxError, SyntaxResult};

/// Split one argument string on its top-level commas.
///
/// Commas inside quoted strings, `()`, `[]` and `{}` are kept in the current
/// argument. Each argument is trimmed; empty input gives no arguments.
///
/// # Example
/// ```
/// use recast::dsl::split_arguments;
///
/// let args = split_arguments(r#"a, [b, c], {"k": "v"}, "x,y""#).unwrap();
/// assert_eq!(args, vec!["a", "[b, c]", r#"{"k": "v"}"#, r#""x,y""#]);
/// ```
pub fn split_arguments(raw: &str) -> SyntaxResult<Vec<String>> {
    let input = raw.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    if !input.contains(|c| matches!(c, '"' | '(' | ')' | '[' | ']' | '{' | '}')) {
        return Ok(input.split(',').map(|s| s.trim().to_string()).collect());
    }

    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut depths = Depths::default();

    for (index, c) in input.char_indices() {
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '(' | '[' | '{' => depths.open(c),
            ')' | ']' | '}' => depths.close(c, index, input)?,
            ',' if depths.is_top_level() => {
                arguments.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    if in_string {
        return Err(SyntaxError::UnclosedString {
            input: input.to_string(),
        });
    }
    depths.ensure_closed(input)?;

    arguments.push(current.trim().to_string());
    Ok(arguments)
}

/// Split `key: value` on its first top-level single colon.
///
/// Quoted strings, brackets and `::` context separators never split.
/// Returns `(None, s)` when there is no such colon.
pub fn split_key_value(s: &str) -> (Option<String>, String) {
    if !s.contains(':') {
        return (None, s.to_string());
    }

    let split_at = if !s.contains(|c| matches!(c, '"' | '{' | '[' | '(')) && !s.contains("::") {
        s.find(':')
    } else {
        find_top_level_colon(s)
    };

    match split_at {
        Some(index) => {
            let key = s[..index].trim();
            if key.is_empty() {
                return (None, s.to_string());
            }
            (Some(key.to_string()), s[index + 1..].trim().to_string())
        }
        None => (None, s.to_string()),
    }
}

fn find_top_level_colon(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut depth: usize = 0;
    let mut index = 0;

    while index < bytes.len() {
        let b = bytes[index];
        if escaped {
            escaped = false;
        } else if in_string && b == b'\\' {
            escaped = true;
        } else if b == b'"' {
            in_string = !in_string;
        } else if !in_string {
            match b {
                b'{' | b'[' | b'(' => depth += 1,
                b'}' | b']' | b')' => depth = depth.saturating_sub(1),
                b':' if bytes.get(index + 1) == Some(&b':') => {
                    // `a::b` belongs to an extraction; skip the whole run.
                    while bytes.get(index) == Some(&b':') {
                        index += 1;
                    }
                    continue;
                }
                b':' if depth == 0 => return Some(index),
                _ => {}
            }
        }
        index += 1;
    }
    None
}

#[derive(Default)]
struct Depths {
    parens: i64,
    brackets: i64,
    braces: i64,
}

impl Depths {
    fn open(&mut self, token: char) {
        match token {
            '(' => self.parens += 1,
            '[' => self.brackets += 1,
            _ => self.braces += 1,
        }
    }

    fn close(&mut self, token: char, index: usize, input: &str) -> SyntaxResult<()> {
        let depth = match token {
            ')' => &mut self.parens,
            ']' => &mut self.brackets,
            _ => &mut self.braces,
        };
        *depth -= 1;
        if *depth < 0 {
            return Err(SyntaxError::UnexpectedToken {
                token,
                index,
                input: input.to_string(),
            });
        }
        Ok(())
    }

    fn is_top_level(&self) -> bool {
        self.parens == 0 && self.brackets == 0 && self.braces == 0
    }

    fn ensure_closed(&self, input: &str) -> SyntaxResult<()> {
        for (token, count) in [('(', self.parens), ('[', self.brackets), ('{', self.braces)] {
            if count > 0 {
                return Err(SyntaxError::UnclosedToken {
                    token,
                    count: count as usize,
                    input: input.to_string(),
                });
            }
        }
        Ok(())
    }
}
