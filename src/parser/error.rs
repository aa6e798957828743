//! Parse-time error taxonomy. Every variant carries the 1-based source line
//! number and the (trimmed) line content, per the contract in `spec.md` §6:
//! "Parser errors carry `(line_index, line_content, message)`".

use thiserror::Error as ThisError;

use super::grammar::SyntaxError;

#[derive(ThisError, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("line {line}: invalid opcode in {content:?}")]
    InvalidOpcode { line: usize, content: String },

    #[error("line {line}: invalid modifier in {content:?}")]
    InvalidModifier { line: usize, content: String },

    #[error("line {line}: missing A-operand in {content:?}")]
    MissingAOperand { line: usize, content: String },

    #[error("line {line}: missing B-operand in {content:?}")]
    MissingBOperand { line: usize, content: String },

    #[error("line {line}: could not parse integer operand in {content:?}")]
    IntegerParse { line: usize, content: String },

    #[error("line {line}: malformed line {content:?}: {message}")]
    MalformedLine {
        line: usize,
        content: String,
        message: String,
    },
}

impl Error {
    /// The 1-based source line this error was produced from.
    pub fn line(&self) -> usize {
        match self {
            Error::InvalidOpcode { line, .. }
            | Error::InvalidModifier { line, .. }
            | Error::MissingAOperand { line, .. }
            | Error::MissingBOperand { line, .. }
            | Error::IntegerParse { line, .. }
            | Error::MalformedLine { line, .. } => *line,
        }
    }

    pub(super) fn from_syntax_error(line: usize, content: &str, err: SyntaxError) -> Self {
        Error::MalformedLine {
            line,
            content: content.to_owned(),
            message: err.to_string(),
        }
    }
}
