//! The data model for a parsed Redcode program: [`OpCode`], [`Modifier`],
//! [`AddressingMode`], [`Field`], [`Instruction`], and [`Warrior`].
//!
//! Nothing in this module knows about a core size; operand values are kept
//! in signed source form here and are only normalized once a [`Warrior`] is
//! loaded into a [`crate::core::Core`].

use std::fmt;

/// The closed set of Redcode operations. `Cmp` and `Seq` are synonyms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpCode {
    Dat,
    Mov,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Jmp,
    Jmz,
    Jmn,
    Djn,
    Cmp,
    Seq,
    Sne,
    Slt,
    Spl,
    Nop,
}

impl OpCode {
    /// Parse a 3-letter opcode mnemonic, case-insensitively.
    pub fn parse(word: &str) -> Option<Self> {
        use OpCode::*;
        Some(match word.to_ascii_uppercase().as_str() {
            "DAT" => Dat,
            "MOV" => Mov,
            "ADD" => Add,
            "SUB" => Sub,
            "MUL" => Mul,
            "DIV" => Div,
            "MOD" => Mod,
            "JMP" => Jmp,
            "JMZ" => Jmz,
            "JMN" => Jmn,
            "DJN" => Djn,
            "CMP" => Cmp,
            "SEQ" => Seq,
            "SNE" => Sne,
            "SLT" => Slt,
            "SPL" => Spl,
            "NOP" => Nop,
            _ => return None,
        })
    }

    /// Whether this opcode may be written without a B-operand in source form.
    pub fn allows_missing_b(self) -> bool {
        matches!(self, OpCode::Dat | OpCode::Jmp | OpCode::Spl | OpCode::Nop)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use OpCode::*;
        let s = match self {
            Dat => "DAT",
            Mov => "MOV",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Mod => "MOD",
            Jmp => "JMP",
            Jmz => "JMZ",
            Jmn => "JMN",
            Djn => "DJN",
            Cmp => "CMP",
            Seq => "SEQ",
            Sne => "SNE",
            Slt => "SLT",
            Spl => "SPL",
            Nop => "NOP",
        };
        write!(f, "{}", s)
    }
}

/// Selects which operand field(s) of the source/destination an opcode acts on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    A,
    B,
    AB,
    BA,
    F,
    X,
    I,
}

impl Modifier {
    /// Parse a modifier mnemonic, case-insensitively.
    pub fn parse(word: &str) -> Option<Self> {
        use Modifier::*;
        Some(match word.to_ascii_uppercase().as_str() {
            "A" => A,
            "B" => B,
            "AB" => AB,
            "BA" => BA,
            "F" => F,
            "X" => X,
            "I" => I,
            _ => return None,
        })
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Modifier::*;
        let s = match self {
            A => "A",
            B => "B",
            AB => "AB",
            BA => "BA",
            F => "F",
            X => "X",
            I => "I",
        };
        write!(f, "{}", s)
    }
}

/// One of the eight standard addressing modes, keyed by its canonical glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressingMode {
    /// `#` — the operand value itself, no indirection.
    Immediate,
    /// `$` — direct addressing.
    Direct,
    /// `*` — A-field indirect.
    AIndirect,
    /// `@` — B-field indirect.
    BIndirect,
    /// `{` — A-field indirect with pre-decrement.
    APreDecIndirect,
    /// `}` — A-field indirect with post-increment.
    APostIncIndirect,
    /// `<` — B-field indirect with pre-decrement.
    BPreDecIndirect,
    /// `>` — B-field indirect with post-increment.
    BPostIncIndirect,
}

impl AddressingMode {
    /// Parse a single addressing-mode glyph.
    pub fn parse(glyph: char) -> Option<Self> {
        use AddressingMode::*;
        Some(match glyph {
            '#' => Immediate,
            '$' => Direct,
            '*' => AIndirect,
            '@' => BIndirect,
            '{' => APreDecIndirect,
            '}' => APostIncIndirect,
            '<' => BPreDecIndirect,
            '>' => BPostIncIndirect,
            _ => return None,
        })
    }

    /// The canonical single-character glyph for this mode.
    pub fn glyph(self) -> char {
        use AddressingMode::*;
        match self {
            Immediate => '#',
            Direct => '$',
            AIndirect => '*',
            BIndirect => '@',
            APreDecIndirect => '{',
            APostIncIndirect => '}',
            BPreDecIndirect => '<',
            BPostIncIndirect => '>',
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// One operand: a value and the addressing mode it should be read under.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Field {
    pub value: i32,
    pub mode: AddressingMode,
}

impl Field {
    pub fn new(value: i32, mode: AddressingMode) -> Self {
        Self { value, mode }
    }

    pub fn immediate(value: i32) -> Self {
        Self::new(value, AddressingMode::Immediate)
    }

    pub fn direct(value: i32) -> Self {
        Self::new(value, AddressingMode::Direct)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode, self.value)
    }
}

/// A single Redcode instruction: an opcode, a modifier, and two operands.
///
/// Operand values here are in raw signed source form; [`crate::core::Core`]
/// normalizes them into `[0, core_size)` when a cell is written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instruction {
    pub opcode: OpCode,
    pub modifier: Modifier,
    pub a_field: Field,
    pub b_field: Field,
}

impl Instruction {
    pub fn new(opcode: OpCode, modifier: Modifier, a_field: Field, b_field: Field) -> Self {
        Self {
            opcode,
            modifier,
            a_field,
            b_field,
        }
    }
}

impl Default for Instruction {
    /// The canonical "kill" cell: `DAT.F $0, $0`.
    fn default() -> Self {
        Self::new(OpCode::Dat, Modifier::F, Field::direct(0), Field::direct(0))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:<2} {}, {}",
            self.opcode, self.modifier, self.a_field, self.b_field
        )
    }
}

/// A parsed program: a name and an ordered sequence of instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warrior {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl Warrior {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl Default for Warrior {
    fn default() -> Self {
        Self {
            name: "Warrior".to_owned(),
            instructions: Vec::new(),
        }
    }
}

impl fmt::Display for Warrior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";name {}", self.name)?;
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_instruction_is_kill_cell() {
        let inst = Instruction::default();
        assert_eq!(inst.opcode, OpCode::Dat);
        assert_eq!(inst.modifier, Modifier::F);
        assert_eq!(inst.a_field, Field::direct(0));
        assert_eq!(inst.b_field, Field::direct(0));
    }

    #[test]
    fn opcode_roundtrips_case_insensitively() {
        for (word, expected) in [
            ("dat", OpCode::Dat),
            ("DAT", OpCode::Dat),
            ("Mov", OpCode::Mov),
            ("spl", OpCode::Spl),
        ] {
            assert_eq!(OpCode::parse(word), Some(expected));
        }
        assert_eq!(OpCode::parse("xyz"), None);
    }

    #[test]
    fn addressing_mode_glyphs_roundtrip() {
        for glyph in ['#', '$', '*', '@', '{', '}', '<', '>'] {
            let mode = AddressingMode::parse(glyph).unwrap();
            assert_eq!(mode.glyph(), glyph);
        }
        assert_eq!(AddressingMode::parse('%'), None);
    }

    #[test]
    fn instruction_display_reparses_to_equal_instruction() {
        let inst = Instruction::new(
            OpCode::Mov,
            Modifier::I,
            Field::direct(0),
            Field::immediate(-1),
        );
        let rendered = inst.to_string();
        assert_eq!(rendered, "MOV.I  $0, #-1");
    }
}
