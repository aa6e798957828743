//! The single-step execution engine: fetch, evaluate the A- and B-operands
//! (predec/postinc side effects included), then dispatch the opcode.
//!
//! Per-step registers are taken as value copies exactly once -- IR at fetch,
//! then the instruction found at each operand's final target address -- so
//! that later side effects from operand evaluation never retroactively
//! change what the opcode dispatch sees. `DJN` is the one opcode that
//! deliberately breaks this rule: it decrements its target in the core and
//! re-reads the result, rather than operating on the value copy.

use crate::core::Core;
use crate::load_file::{AddressingMode, Field, Instruction, Modifier, OpCode};

/// What a single step did: which addresses it touched, where the process
/// should resume, whether it forked a new process, and whether it died.
#[derive(Debug, Default)]
pub struct Outcome {
    pub written: Vec<i32>,
    pub next_pc: Option<i32>,
    pub forked_pc: Option<i32>,
    pub died: bool,
}

/// Execute the instruction at `pc`, which must already be the current
/// process's pointer.
pub fn step(core: &mut Core, pc: i32) -> Outcome {
    let ir = *core.get(pc);
    let mut outcome = Outcome::default();

    let (a_addr, a_instr) = eval_operand(core, pc, ir.a_field, &mut outcome.written);
    let (b_addr, b_instr) = eval_operand(core, pc, ir.b_field, &mut outcome.written);

    match ir.opcode {
        OpCode::Dat => outcome.died = true,
        OpCode::Nop => {}
        OpCode::Mov => do_mov(core, ir.modifier, a_instr, b_addr, &mut outcome),
        OpCode::Add => do_arith(core, ir.modifier, a_instr, b_addr, &mut outcome, |d, s| {
            Some(d.wrapping_add(s))
        }),
        OpCode::Sub => do_arith(core, ir.modifier, a_instr, b_addr, &mut outcome, |d, s| {
            Some(d.wrapping_sub(s))
        }),
        OpCode::Mul => do_arith(core, ir.modifier, a_instr, b_addr, &mut outcome, |d, s| {
            Some(d.wrapping_mul(s))
        }),
        OpCode::Div => do_arith(core, ir.modifier, a_instr, b_addr, &mut outcome, |d, s| {
            if s == 0 {
                None
            } else {
                Some(d / s)
            }
        }),
        OpCode::Mod => do_arith(core, ir.modifier, a_instr, b_addr, &mut outcome, |d, s| {
            if s == 0 {
                None
            } else {
                Some(d % s)
            }
        }),
        OpCode::Jmp => {
            outcome.next_pc = Some(a_addr);
        }
        OpCode::Jmz => {
            if all_selected_zero(ir.modifier, b_instr) {
                outcome.next_pc = Some(a_addr);
            }
        }
        OpCode::Jmn => {
            if !all_selected_zero(ir.modifier, b_instr) {
                outcome.next_pc = Some(a_addr);
            }
        }
        OpCode::Djn => do_djn(core, ir.modifier, b_addr, a_addr, &mut outcome),
        OpCode::Cmp | OpCode::Seq => {
            if fields_equal(ir.modifier, a_instr, b_instr) {
                outcome.next_pc = Some(core.normalize(pc + 2));
            }
        }
        OpCode::Sne => {
            if !fields_equal(ir.modifier, a_instr, b_instr) {
                outcome.next_pc = Some(core.normalize(pc + 2));
            }
        }
        OpCode::Slt => {
            if a_less_than_b(ir.modifier, a_instr, b_instr) {
                outcome.next_pc = Some(core.normalize(pc + 2));
            }
        }
        OpCode::Spl => {
            outcome.forked_pc = Some(a_addr);
        }
    }

    outcome
}

fn push_unique(written: &mut Vec<i32>, addr: i32) {
    if !written.contains(&addr) {
        written.push(addr);
    }
}

/// Resolve one operand field to its final target address and a value copy
/// of the instruction found there (P3/P4 of the step).
fn eval_operand(core: &mut Core, pc: i32, field: Field, written: &mut Vec<i32>) -> (i32, Instruction) {
    use AddressingMode::*;

    if field.mode == Immediate {
        let addr = core.normalize(pc);
        return (addr, *core.get(addr));
    }

    let intermediate = core.normalize(pc + field.value);
    if field.mode == Direct {
        push_unique(written, intermediate);
        return (intermediate, *core.get(intermediate));
    }

    push_unique(written, intermediate);
    let is_a_side = matches!(field.mode, AIndirect | APreDecIndirect | APostIncIndirect);
    let predec = matches!(field.mode, APreDecIndirect | BPreDecIndirect);
    let postinc = matches!(field.mode, APostIncIndirect | BPostIncIndirect);

    if predec {
        let mut cell = *core.get(intermediate);
        bump_field(&mut cell, is_a_side, -1, core.core_size());
        core.write(intermediate, cell);
    }

    let pointer = {
        let cell = core.get(intermediate);
        if is_a_side {
            cell.a_field.value
        } else {
            cell.b_field.value
        }
    };

    if postinc {
        let mut cell = *core.get(intermediate);
        bump_field(&mut cell, is_a_side, 1, core.core_size());
        core.write(intermediate, cell);
    }

    let target = core.normalize(intermediate + pointer);
    push_unique(written, target);
    (target, *core.get(target))
}

fn bump_field(instruction: &mut Instruction, a_side: bool, delta: i32, core_size: i32) {
    let field = if a_side {
        &mut instruction.a_field
    } else {
        &mut instruction.b_field
    };
    field.value = field.value.wrapping_add(delta).rem_euclid(core_size);
}

#[derive(Copy, Clone)]
enum Side {
    A,
    B,
}

/// The (source side, destination side) field pairs a modifier selects.
fn field_pairs(modifier: Modifier) -> &'static [(Side, Side)] {
    use Modifier::*;
    use Side::*;
    match modifier {
        A => &[(A, A)],
        B => &[(B, B)],
        AB => &[(A, B)],
        BA => &[(B, A)],
        F | I => &[(A, A), (B, B)],
        X => &[(A, B), (B, A)],
    }
}

fn field_value(instruction: &Instruction, side: Side) -> i32 {
    match side {
        Side::A => instruction.a_field.value,
        Side::B => instruction.b_field.value,
    }
}

fn field_mut(instruction: &mut Instruction, side: Side) -> &mut Field {
    match side {
        Side::A => &mut instruction.a_field,
        Side::B => &mut instruction.b_field,
    }
}

fn do_mov(core: &mut Core, modifier: Modifier, src: Instruction, dest_addr: i32, outcome: &mut Outcome) {
    let mut dest = *core.get(dest_addr);
    if modifier == Modifier::I {
        dest = src;
    } else {
        for &(src_side, dest_side) in field_pairs(modifier) {
            field_mut(&mut dest, dest_side).value = field_value(&src, src_side);
        }
    }
    core.write(dest_addr, dest);
    push_unique(&mut outcome.written, dest_addr);
}

fn do_arith(
    core: &mut Core,
    modifier: Modifier,
    src: Instruction,
    dest_addr: i32,
    outcome: &mut Outcome,
    op: impl Fn(i32, i32) -> Option<i32>,
) {
    let core_size = core.core_size();
    let mut dest = *core.get(dest_addr);
    for &(src_side, dest_side) in field_pairs(modifier) {
        let Some(result) = op(field_value(&dest, dest_side), field_value(&src, src_side)) else {
            outcome.died = true;
            return;
        };
        field_mut(&mut dest, dest_side).value = result.rem_euclid(core_size);
    }
    core.write(dest_addr, dest);
    push_unique(&mut outcome.written, dest_addr);
}

/// `DJN` decrements its B-target's selected field(s) directly in the core,
/// then jumps if the result is nonzero -- it never reads a stale copy.
fn do_djn(core: &mut Core, modifier: Modifier, dest_addr: i32, jump_target: i32, outcome: &mut Outcome) {
    let core_size = core.core_size();
    let mut dest = *core.get(dest_addr);
    let mut any_nonzero = false;
    for &(_src_side, dest_side) in field_pairs(modifier) {
        let field = field_mut(&mut dest, dest_side);
        field.value = field.value.wrapping_sub(1).rem_euclid(core_size);
        if field.value != 0 {
            any_nonzero = true;
        }
    }
    core.write(dest_addr, dest);
    push_unique(&mut outcome.written, dest_addr);
    if any_nonzero {
        outcome.next_pc = Some(jump_target);
    }
}

fn all_selected_zero(modifier: Modifier, instruction: Instruction) -> bool {
    field_pairs(modifier)
        .iter()
        .all(|&(_, dest_side)| field_value(&instruction, dest_side) == 0)
}

fn fields_equal(modifier: Modifier, a: Instruction, b: Instruction) -> bool {
    if modifier == Modifier::I {
        return a == b;
    }
    field_pairs(modifier)
        .iter()
        .all(|&(src_side, dest_side)| field_value(&a, src_side) == field_value(&b, dest_side))
}

fn a_less_than_b(modifier: Modifier, a: Instruction, b: Instruction) -> bool {
    if modifier == Modifier::I {
        return a < b;
    }
    field_pairs(modifier)
        .iter()
        .all(|&(src_side, dest_side)| field_value(&a, src_side) < field_value(&b, dest_side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoreConfig;
    use crate::load_file::{Field, Instruction, Modifier, OpCode};

    fn test_core() -> Core {
        Core::new(CoreConfig {
            core_size: 100,
            ..CoreConfig::default()
        })
    }

    #[test]
    fn dat_kills_the_process() {
        let mut core = test_core();
        core.write(0, Instruction::default());
        let outcome = step(&mut core, 0);
        assert!(outcome.died);
    }

    #[test]
    fn imp_copies_itself_forward() {
        let mut core = test_core();
        let imp = Instruction::new(OpCode::Mov, Modifier::I, Field::direct(0), Field::direct(1));
        core.write(0, imp);
        let outcome = step(&mut core, 0);
        assert!(!outcome.died);
        assert_eq!(*core.get(1), imp);
        assert_eq!(outcome.written, vec![0, 1]);
    }

    #[test]
    fn add_applies_ab_default_modifier_to_dest_b_field() {
        let mut core = test_core();
        core.write(
            0,
            Instruction::new(OpCode::Add, Modifier::AB, Field::immediate(4), Field::direct(1)),
        );
        core.write(1, Instruction::new(OpCode::Dat, Modifier::F, Field::direct(0), Field::direct(10)));
        step(&mut core, 0);
        assert_eq!(core.get(1).b_field.value, 14);
    }

    #[test]
    fn div_by_zero_kills_the_process() {
        let mut core = test_core();
        core.write(
            0,
            Instruction::new(OpCode::Div, Modifier::AB, Field::immediate(0), Field::direct(1)),
        );
        core.write(1, Instruction::new(OpCode::Dat, Modifier::F, Field::direct(0), Field::direct(5)));
        let outcome = step(&mut core, 0);
        assert!(outcome.died);
    }

    #[test]
    fn jmz_jumps_when_b_operand_is_zero() {
        let mut core = test_core();
        core.write(
            0,
            Instruction::new(OpCode::Jmz, Modifier::B, Field::direct(10), Field::direct(1)),
        );
        core.write(1, Instruction::new(OpCode::Dat, Modifier::F, Field::direct(0), Field::direct(0)));
        let outcome = step(&mut core, 0);
        assert_eq!(outcome.next_pc, Some(10));
    }

    #[test]
    fn djn_decrements_in_core_and_jumps_until_zero() {
        let mut core = test_core();
        core.write(
            0,
            Instruction::new(OpCode::Djn, Modifier::B, Field::direct(10), Field::direct(1)),
        );
        core.write(1, Instruction::new(OpCode::Dat, Modifier::F, Field::direct(0), Field::direct(1)));
        let outcome = step(&mut core, 0);
        assert_eq!(core.get(1).b_field.value, 0);
        assert_eq!(outcome.next_pc, None);
    }

    #[test]
    fn spl_seeds_a_new_process_at_the_target_and_advances_normally() {
        let mut core = test_core();
        core.write(0, Instruction::new(OpCode::Spl, Modifier::B, Field::direct(5), Field::direct(0)));
        let outcome = step(&mut core, 0);
        assert_eq!(outcome.forked_pc, Some(5));
        assert_eq!(outcome.next_pc, None);
    }

    #[test]
    fn slt_i_compares_whole_instructions_not_just_numeric_fields() {
        let mut core = test_core();
        // `slt.i $1, $2`: A-operand is the MOV at address 1, B-operand is the
        // DAT at address 2. Field-wise, 5 < 10 on both fields, but MOV's
        // opcode discriminant sorts after DAT's, so the whole instruction is
        // not "less than" and the jump must not fire.
        core.write(0, Instruction::new(OpCode::Slt, Modifier::I, Field::direct(1), Field::direct(2)));
        core.write(1, Instruction::new(OpCode::Mov, Modifier::AB, Field::direct(5), Field::direct(5)));
        core.write(2, Instruction::new(OpCode::Dat, Modifier::F, Field::direct(10), Field::direct(10)));
        let outcome = step(&mut core, 0);
        assert_eq!(outcome.next_pc, None);
    }

    #[test]
    fn post_increment_indirection_bumps_the_pointer_after_use() {
        let mut core = test_core();
        // `mov.i $0, }1` moves through cell 1's A-field (a post-inc pointer).
        core.write(0, Instruction::new(OpCode::Mov, Modifier::I, Field::direct(0), Field::new(1, AddressingMode::APostIncIndirect)));
        core.write(1, Instruction::new(OpCode::Dat, Modifier::F, Field::direct(20), Field::direct(0)));
        let outcome = step(&mut core, 0);
        assert_eq!(core.get(1).a_field.value, 21);
        assert!(!outcome.died);
    }
}
