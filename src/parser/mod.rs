//! Text source to [`crate::load_file::Warrior`].
//!
//! A Redcode source file is a sequence of lines, each either blank, a
//! `;`-comment (optionally a `;name` directive naming the warrior), or one
//! instruction. There is no label or expression language here: operand
//! values are plain signed integers, per spec.md §4.1.

mod error;
mod grammar;
mod instruction;

pub use error::Error;

use crate::load_file::Warrior;
use grammar::Rule;

/// Parse a complete warrior source file.
///
/// Blank lines are skipped. A leading `;name <text>` comment (case
/// insensitive) sets the warrior's name; other comments are discarded.
/// A source file with no instructions parses successfully and yields
/// `Ok(None)` — an empty warrior is silently dropped rather than loaded.
pub fn parse(input: &str) -> Result<Option<Warrior>, Error> {
    let mut name = None;
    let mut instructions = Vec::new();

    for (index, raw_line) in input.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(found) = parse_name_directive(trimmed) {
            if name.is_none() {
                name = Some(found.to_owned());
            }
            continue;
        }

        let mut pairs = grammar::parse_line(trimmed)
            .map_err(|err| Error::from_syntax_error(line_number, trimmed, err))?;
        let line_pair = pairs.next().ok_or_else(|| Error::MalformedLine {
            line: line_number,
            content: trimmed.to_owned(),
            message: "empty parse".to_owned(),
        })?;

        let mut children = line_pair.into_inner();
        let Some(first) = children.next() else {
            continue;
        };
        match first.as_rule() {
            Rule::comment => continue,
            Rule::instruction => {
                instructions.push(instruction::build(first, line_number, trimmed)?);
            }
            _ => {}
        }
    }

    if instructions.is_empty() {
        return Ok(None);
    }

    Ok(Some(Warrior {
        name: name.unwrap_or_else(|| Warrior::default().name),
        instructions,
    }))
}

fn parse_name_directive(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix(';')?;
    let rest = rest.trim_start();
    if rest.len() < "name".len() || !rest[.."name".len()].eq_ignore_ascii_case("name") {
        return None;
    }
    let rest = &rest["name".len()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}
