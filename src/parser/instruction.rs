//! Semantic validation and construction of an [`Instruction`] from a parsed
//! `instruction` pair: closed-set opcode/modifier lookup, operand-count
//! rules, the DAT-single-operand rule, and the default-modifier table.

use super::error::Error;
use super::grammar::{Pair, Rule};
use crate::load_file::{AddressingMode, Field, Instruction, Modifier, OpCode};

/// Build an [`Instruction`] out of the `instruction` pair produced by the
/// grammar. `line` and `content` are only used to annotate errors.
pub fn build(pair: Pair, line: usize, content: &str) -> Result<Instruction, Error> {
    let mut words = Vec::new();
    let mut fields = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::word => words.push(inner.as_str()),
            Rule::field => fields.push(parse_field(inner, line, content)?),
            Rule::trailing => {}
            _ => {}
        }
    }

    let opcode_word = words.first().copied().ok_or_else(|| Error::MalformedLine {
        line,
        content: content.to_owned(),
        message: "no opcode".to_owned(),
    })?;
    let opcode = OpCode::parse(opcode_word).ok_or_else(|| Error::InvalidOpcode {
        line,
        content: content.to_owned(),
    })?;

    let explicit_modifier = match words.get(1) {
        Some(word) => Some(Modifier::parse(word).ok_or_else(|| Error::InvalidModifier {
            line,
            content: content.to_owned(),
        })?),
        None => None,
    };

    let (a_field, b_field) = match fields.len() {
        // `DAT #0` and the like: the single operand is the B-field, per
        // spec.md's DAT-single-operand rule; the A-field defaults to `$0`.
        1 if opcode == OpCode::Dat => (Field::direct(0), fields[0]),
        1 if opcode.allows_missing_b() => (fields[0], Field::direct(0)),
        1 => {
            return Err(Error::MissingBOperand {
                line,
                content: content.to_owned(),
            })
        }
        2 => (fields[0], fields[1]),
        0 => {
            return Err(Error::MissingAOperand {
                line,
                content: content.to_owned(),
            })
        }
        _ => {
            return Err(Error::MalformedLine {
                line,
                content: content.to_owned(),
                message: "too many operands".to_owned(),
            })
        }
    };

    let modifier = explicit_modifier.unwrap_or_else(|| default_modifier(opcode, a_field, b_field));

    Ok(Instruction::new(opcode, modifier, a_field, b_field))
}

fn parse_field(pair: Pair, line: usize, content: &str) -> Result<Field, Error> {
    let mut mode = None;
    let mut value = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::address_mode => {
                mode = AddressingMode::parse(inner.as_str().chars().next().unwrap());
            }
            Rule::number => {
                value = Some(inner.as_str().parse::<i32>().map_err(|_| Error::IntegerParse {
                    line,
                    content: content.to_owned(),
                })?);
            }
            _ => {}
        }
    }
    let value = value.ok_or_else(|| Error::IntegerParse {
        line,
        content: content.to_owned(),
    })?;
    Ok(Field::new(value, mode.unwrap_or(AddressingMode::Direct)))
}

/// The ICWS-94 default-modifier table: applied whenever a line omits the
/// `.modifier` suffix.
fn default_modifier(opcode: OpCode, a_field: Field, b_field: Field) -> Modifier {
    use AddressingMode::Immediate;
    use OpCode::*;

    match opcode {
        Dat => Modifier::F,
        Mov | Seq | Sne | Cmp => {
            if a_field.mode == Immediate {
                Modifier::AB
            } else if b_field.mode == Immediate {
                Modifier::B
            } else {
                Modifier::I
            }
        }
        Add | Sub | Mul | Div | Mod => {
            if a_field.mode == Immediate {
                Modifier::AB
            } else if b_field.mode == Immediate {
                Modifier::B
            } else {
                Modifier::F
            }
        }
        Slt => {
            if a_field.mode == Immediate {
                Modifier::AB
            } else {
                Modifier::B
            }
        }
        Jmp | Jmz | Jmn | Djn | Spl | Nop => Modifier::B,
    }
}
