//! The PEG grammar for one line of Redcode, and thin pest plumbing around it.

use pest::Parser as _;
use pest_derive::Parser;

pub type Pair<'a> = pest::iterators::Pair<'a, Rule>;
pub type Pairs<'a> = pest::iterators::Pairs<'a, Rule>;
pub type SyntaxError = pest::error::Error<Rule>;

#[derive(Parser)]
#[grammar = "parser/grammar/redcode.pest"]
pub struct Grammar;

/// Parse a single line of Redcode source according to the grammar,
/// producing the top-level `line` pair's children.
pub fn parse_line(line: &str) -> Result<Pairs, SyntaxError> {
    Grammar::parse(Rule::line, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules_of(line: &str) -> Vec<Rule> {
        parse_line(line)
            .unwrap()
            .flatten()
            .map(|pair| pair.as_rule())
            .collect()
    }

    #[test]
    fn parses_plain_instruction() {
        let rules = rules_of("mov $0, $1");
        assert!(rules.contains(&Rule::instruction));
        assert!(rules.contains(&Rule::word));
        assert!(rules.contains(&Rule::field));
        assert!(rules.contains(&Rule::number));
    }

    #[test]
    fn parses_modifier() {
        let words: Vec<_> = parse_line("mov.i $0, $1")
            .unwrap()
            .flatten()
            .filter(|p| p.as_rule() == Rule::word)
            .map(|p| p.as_str().to_owned())
            .collect();
        assert_eq!(words, vec!["mov", "i"]);
    }

    #[test]
    fn parses_name_comment() {
        let rules = rules_of(";name Dwarf");
        assert!(rules.contains(&Rule::comment));
    }

    #[test]
    fn parses_single_operand_dat() {
        let fields: Vec<_> = parse_line("dat #0")
            .unwrap()
            .flatten()
            .filter(|p| p.as_rule() == Rule::field)
            .collect();
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn rejects_lines_with_no_opcode_word() {
        assert!(parse_line("123 $0, $1").is_err());
    }

    #[test]
    fn discards_trailing_garbage_after_last_field() {
        let numbers: Vec<_> = parse_line("add.ab #4, $3 win the battle")
            .unwrap()
            .flatten()
            .filter(|p| p.as_rule() == Rule::number)
            .map(|p| p.as_str().to_owned())
            .collect();
        assert_eq!(numbers, vec!["4", "3"]);
    }
}
