//! End-to-end battles: parse a warrior (or two), load it into a core, and
//! check what the simulation actually does.

use redmars::core::{BattleResult, Core, CoreConfig};
use redmars::load_file::{AddressingMode, Field, Instruction, Modifier, OpCode};
use redmars::parser;

fn small_core(core_size: i32, max_cycles: i32) -> Core {
    Core::new(CoreConfig {
        core_size,
        max_cycles,
        ..CoreConfig::default()
    })
}

#[test]
fn imp_fills_the_entire_core_before_dying_of_old_age() {
    let warrior = parser::parse(";name Imp\nmov $0, $1\n").unwrap().unwrap();
    let mut core = small_core(64, 1000);
    core.load_warrior(&warrior, 0).unwrap();

    let results = core.run();
    assert_eq!(results, vec![BattleResult::Win]);
    assert_eq!(core.steps_taken(), 1000);

    // Every cell in the core should now hold a copy of the Imp instruction.
    let imp_instruction = Instruction::new(
        OpCode::Mov,
        Modifier::I,
        Field::direct(0),
        Field::direct(1),
    );
    for address in 0..core.core_size() {
        assert_eq!(core.get(address), &imp_instruction);
    }
}

#[test]
fn dat_instruction_kills_the_process_that_runs_into_it() {
    let warrior = parser::parse(";name Suicide\ndat #0, #0\n").unwrap().unwrap();
    let mut core = small_core(128, 100);
    core.load_warrior(&warrior, 0).unwrap();

    core.cycle();
    assert!(!core.warriors()[0].is_alive());
}

#[test]
fn spl_forks_a_second_process_that_survives_the_parent() {
    // SPL to the next cell, then the parent immediately suicides while the
    // forked child keeps executing NOPs (and thus survives).
    let warrior = parser::parse(";name Replicator\nspl $1\ndat #0, #0\nnop\n")
        .unwrap()
        .unwrap();
    let mut core = small_core(128, 100);
    core.load_warrior(&warrior, 0).unwrap();

    assert_eq!(core.warriors()[0].process_count(), 1);
    core.cycle(); // executes SPL: seeds a new process at $1, parent advances normally to pc+1
    assert_eq!(core.warriors()[0].process_count(), 2);

    // One of the two processes is now sitting on the DAT at address 1; the
    // other is at address 2 (the NOP). Whichever runs next dies or survives
    // accordingly, but the warrior as a whole must still be alive.
    core.cycle();
    assert!(core.warriors()[0].is_alive());
}

#[test]
fn dwarf_eventually_kills_a_stationary_imp() {
    // A classic Dwarf: bombs every 4th cell with a DAT, then loops forever.
    let dwarf = parser::parse(
        ";name Dwarf\nadd.ab #4, $3\nmov $3, @2\njmp $-2\ndat #0, #0\n",
    )
    .unwrap()
    .unwrap();
    // A warrior that just spins in place, never moving or defending itself.
    let stationary = parser::parse(";name Stationary\njmp $0\n").unwrap().unwrap();

    let mut core = small_core(2000, 20_000);
    core.load_warrior(&dwarf, 0).unwrap();
    core.load_warrior(&stationary, 1000).unwrap();

    let results = core.run();
    assert_eq!(results[0], BattleResult::Win);
    assert_eq!(results[1], BattleResult::Loss);
}

#[test]
fn loading_past_the_end_of_the_core_wraps_around() {
    let warrior = parser::parse(";name Tail\nnop\nnop\nnop\n").unwrap().unwrap();
    let mut core = small_core(5, 10);
    core.load_warrior(&warrior, 3).unwrap();

    assert_eq!(core.get(3).opcode, OpCode::Nop);
    assert_eq!(core.get(4).opcode, OpCode::Nop);
    // The third instruction wraps around to address 0.
    assert_eq!(core.get(0).opcode, OpCode::Nop);
}

#[test]
fn killing_a_process_rotates_scheduling_to_the_next_one_without_skipping() {
    let warrior = parser::parse(
        ";name Forker\nspl $1\nspl $1\ndat #0, #0\nnop\n",
    )
    .unwrap()
    .unwrap();
    let mut core = small_core(128, 10);
    core.load_warrior(&warrior, 0).unwrap();

    core.cycle(); // process 0 runs SPL at 0: forks a process at 1, jumps to 1
    core.cycle(); // whichever process is current runs SPL at 1: forks again
    assert_eq!(core.warriors()[0].process_count(), 3);
}

#[test]
fn two_warriors_can_tie_by_exhausting_the_cycle_budget() {
    let a = parser::parse(";name Spinner\njmp $0\n").unwrap().unwrap();
    let b = parser::parse(";name AlsoSpinner\njmp $0\n").unwrap().unwrap();

    let mut core = small_core(200, 300);
    core.load_warrior(&a, 0).unwrap();
    core.load_warrior(&b, 100).unwrap();

    let results = core.run();
    assert_eq!(results, vec![BattleResult::Tie, BattleResult::Tie]);
}

#[test]
fn post_increment_indirection_bumps_the_pointer_cell_after_use() {
    // `>1` at address 0 resolves through cell 1's B-field (post-incremented
    // after use) to find its real target: cell (1 + 3) = 4.
    let warrior = parser::parse(";name Pointer\nmov.i $2, >1\ndat #3, #3\ndat #9, #9\n")
        .unwrap()
        .unwrap();
    let mut core = small_core(64, 10);
    core.load_warrior(&warrior, 0).unwrap();

    core.cycle();

    assert_eq!(core.get(1).b_field, Field::new(4, AddressingMode::Immediate));
    assert_eq!(
        core.get(4),
        &Instruction::new(OpCode::Dat, Modifier::F, Field::immediate(9), Field::immediate(9)),
    );
}
