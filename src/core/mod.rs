//! A [`Core`] is the circular block of memory that warriors are loaded into
//! and battle within. This is where a round of simulation actually happens.

use std::fmt;

use log::trace;
use rand::Rng;
use thiserror::Error as ThisError;

use crate::load_file::{Instruction, Warrior};

mod engine;
mod process;

pub use process::CoreWarrior;

const DEFAULT_MAX_CYCLES: i32 = 10_000;
const DEFAULT_CORE_SIZE: i32 = 8_000;
const DEFAULT_MAX_PROCESSES: i32 = 10_000;
const DEFAULT_MAX_WARRIOR_LENGTH: i32 = 100;
const DEFAULT_MIN_DISTANCE: i32 = 1_000;

/// An error occurred while building or loading a [`Core`].
#[derive(ThisError, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The warrior was longer than `max_warrior_length`.
    #[error("warrior has too many instructions")]
    WarriorTooLong,

    /// `min_distance`/`max_warrior_length` left no room to place every warrior.
    #[error("no room for {0} warriors with min_distance {1} in a core of size {2}")]
    NoRoomToLoad(usize, i32, i32),
}

/// Host-tunable parameters for a battle, per ICWS-94 \S 3.
pub struct CoreConfig {
    pub core_size: i32,
    pub max_cycles: i32,
    pub max_processes: i32,
    pub max_warrior_length: i32,
    pub min_distance: i32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            core_size: DEFAULT_CORE_SIZE,
            max_cycles: DEFAULT_MAX_CYCLES,
            max_processes: DEFAULT_MAX_PROCESSES,
            max_warrior_length: DEFAULT_MAX_WARRIOR_LENGTH,
            min_distance: DEFAULT_MIN_DISTANCE,
        }
    }
}

pub type WarriorId = usize;

/// The fate of one warrior at the end of a battle.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BattleResult {
    Win,
    Loss,
    Tie,
}

impl fmt::Display for BattleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleResult::Win => write!(f, "Win"),
            BattleResult::Loss => write!(f, "Loss"),
            BattleResult::Tie => write!(f, "Tie"),
        }
    }
}

/// The full memory core at a given point in time, plus every warrior's
/// scheduling state.
pub struct Core {
    config: CoreConfig,
    cells: Box<[Instruction]>,
    warriors: Vec<CoreWarrior>,
    current_warrior: usize,
    steps_taken: i32,
}

impl Core {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            cells: vec![Instruction::default(); config.core_size as usize].into_boxed_slice(),
            config,
            warriors: Vec::new(),
            current_warrior: 0,
            steps_taken: 0,
        }
    }

    #[must_use]
    pub fn core_size(&self) -> i32 {
        self.cells.len() as i32
    }

    #[must_use]
    pub fn steps_taken(&self) -> i32 {
        self.steps_taken
    }

    #[must_use]
    pub fn warriors(&self) -> &[CoreWarrior] {
        &self.warriors
    }

    /// Reduce a signed address to `[0, core_size)`.
    #[must_use]
    pub fn normalize(&self, value: i32) -> i32 {
        value.rem_euclid(self.core_size())
    }

    #[must_use]
    pub fn get(&self, address: i32) -> &Instruction {
        &self.cells[self.normalize(address) as usize]
    }

    /// Write an instruction into the core, normalizing its operand values
    /// as they land (no cell ever holds an out-of-range value).
    pub fn write(&mut self, address: i32, mut value: Instruction) {
        value.a_field.value = self.normalize(value.a_field.value);
        value.b_field.value = self.normalize(value.b_field.value);
        let address = self.normalize(address);
        self.cells[address as usize] = value;
    }

    /// Load a single warrior at a fixed base address, without regard for
    /// `min_distance` from any other warrior. Mostly useful for tests.
    pub fn load_warrior(&mut self, warrior: &Warrior, base_address: i32) -> Result<WarriorId, Error> {
        if warrior.len() > self.config.max_warrior_length as usize {
            return Err(Error::WarriorTooLong);
        }

        for (offset, instruction) in warrior.instructions.iter().enumerate() {
            self.write(base_address + offset as i32, *instruction);
        }

        let id = self.warriors.len();
        let mut core_warrior = CoreWarrior::new(warrior.name.clone());
        core_warrior.add_process(self.normalize(base_address));
        self.warriors.push(core_warrior);
        Ok(id)
    }

    /// Load every warrior at pseudo-randomly jittered, minimum-distance-apart
    /// starting addresses, then shuffle their turn order.
    ///
    /// Mirrors the reference loader: warriors are spaced `core_size /
    /// warriors.len()` apart around the ring, each with an independent
    /// random jitter within its slot, and play order is shuffled rather
    /// than left in load order.
    pub fn load_warriors(&mut self, warriors: &[Warrior]) -> Result<Vec<WarriorId>, Error> {
        if warriors.is_empty() {
            return Ok(Vec::new());
        }

        for warrior in warriors {
            if warrior.len() > self.config.max_warrior_length as usize {
                return Err(Error::WarriorTooLong);
            }
        }

        let core_size = self.core_size();
        let slot = core_size / warriors.len() as i32;
        let max_warrior_length = warriors.iter().map(Warrior::len).max().unwrap_or(0) as i32;
        if slot < self.config.min_distance + max_warrior_length {
            return Err(Error::NoRoomToLoad(
                warriors.len(),
                self.config.min_distance,
                core_size,
            ));
        }

        let mut rng = rand::thread_rng();
        let jitter_room = slot - self.config.min_distance;

        let mut order: Vec<usize> = (0..warriors.len()).collect();
        // Shuffle play order independently of load order (Fisher-Yates).
        for i in (1..order.len()).rev() {
            let j = rng.gen_range(0..=i);
            order.swap(i, j);
        }

        let mut ids = vec![0; warriors.len()];
        for (slot_index, warrior) in warriors.iter().enumerate() {
            let jitter = if jitter_room > 0 {
                rng.gen_range(0..jitter_room)
            } else {
                0
            };
            let base = self.normalize(slot_index as i32 * slot + jitter);
            let id = self.load_warrior(warrior, base)?;
            ids[slot_index] = id;
        }

        self.current_warrior = order[0];
        Ok(ids)
    }

    pub fn assign_colors(&mut self, palette: &[(u8, u8, u8)]) {
        for (warrior, color) in self.warriors.iter_mut().zip(palette.iter().cycle()) {
            warrior.color = Some(*color);
        }
    }

    #[must_use]
    pub fn current_warrior(&self) -> &CoreWarrior {
        &self.warriors[self.current_warrior]
    }

    /// How many warriors are still alive (have at least one live process).
    /// A warrior that dies stays in [`Core::warriors`] at its original index
    /// so that [`Core::run`]'s results stay aligned with load order, but it
    /// no longer counts here and is skipped by [`Core::rotate_warrior`].
    #[must_use]
    pub fn warriors_count(&self) -> usize {
        self.warriors.iter().filter(|w| w.is_alive()).count()
    }

    /// Hand the turn to the next living warrior (P7 of the step).
    fn rotate_warrior(&mut self) {
        if self.warriors.is_empty() {
            return;
        }
        for _ in 0..self.warriors.len() {
            self.current_warrior = (self.current_warrior + 1) % self.warriors.len();
            if self.warriors[self.current_warrior].is_alive() {
                break;
            }
        }
    }

    /// Run exactly one step: dispatch the current warrior's current process,
    /// then rotate to the next living warrior. Returns the core addresses
    /// touched this step.
    pub fn cycle(&mut self) -> Vec<i32> {
        match self.step() {
            StepResult::Continue(written) => written,
            StepResult::Halt => Vec::new(),
        }
    }

    fn step(&mut self) -> StepResult {
        if self.warriors_count() == 0 {
            return StepResult::Halt;
        }

        let warrior_index = self.current_warrior;
        let Some(pc) = self.warriors[warrior_index].current_pointer() else {
            self.rotate_warrior();
            return StepResult::Continue(Vec::new());
        };

        trace!(
            "step {:>6} warrior {:>2}: {:0>5} {}",
            self.steps_taken,
            warrior_index,
            pc,
            self.get(pc),
        );
        self.steps_taken += 1;

        let outcome = engine::step(self, pc);

        let warrior = &mut self.warriors[warrior_index];
        if outcome.died {
            warrior.kill_current_process();
        } else {
            let next_pc = outcome.next_pc.unwrap_or_else(|| self.normalize(pc + 1));
            warrior.set_current_pointer(next_pc);
            if let Some(forked_pc) = outcome.forked_pc {
                if warrior.process_count() < self.config.max_processes as usize {
                    warrior.add_process(forked_pc);
                }
            }
            warrior.next_process();
        }

        self.rotate_warrior();
        StepResult::Continue(outcome.written)
    }

    /// Run a battle to completion (`max_cycles` steps, or until at most one
    /// warrior survives). Returns each warrior's result, indexed the same
    /// way as the slice passed to [`Core::load_warriors`].
    pub fn run(&mut self) -> Vec<BattleResult> {
        let multiple_warriors = self.warriors.len() > 1;
        while self.steps_taken < self.config.max_cycles {
            if self.warriors_count() == 0 {
                break;
            }
            if multiple_warriors && self.warriors_count() <= 1 {
                break;
            }
            self.cycle();
        }

        let survivors = self.warriors_count();
        self.warriors
            .iter()
            .map(|w| {
                if !w.is_alive() {
                    BattleResult::Loss
                } else if survivors == 1 {
                    BattleResult::Win
                } else {
                    BattleResult::Tie
                }
            })
            .collect()
    }

    fn format_lines<F: Fn(usize, &Instruction) -> String, G: Fn(usize, &Instruction) -> String>(
        &self,
        formatter: &mut fmt::Formatter,
        instruction_prefix: F,
        instruction_suffix: G,
    ) -> fmt::Result {
        let mut lines = Vec::new();
        let mut iter = self.cells.iter().enumerate().peekable();

        while let Some((i, instruction)) = iter.next() {
            let add_line = |line_vec: &mut Vec<String>, j| {
                line_vec.push(
                    instruction_prefix(j, instruction)
                        + &instruction.to_string()
                        + &instruction_suffix(j, instruction),
                );
            };

            if *instruction == Instruction::default() {
                let mut skipped_count = 0;
                while let Some(&(_, inst)) = iter.peek() {
                    if inst != &Instruction::default() {
                        break;
                    }
                    skipped_count += 1;
                    iter.next();
                }

                if skipped_count > 5 {
                    add_line(&mut lines, i);
                    lines.push(format!("; {:<6}({} more)", "...", skipped_count - 2));
                    add_line(&mut lines, i + skipped_count);
                } else {
                    for _ in 0..skipped_count {
                        add_line(&mut lines, i);
                    }
                }
            } else {
                add_line(&mut lines, i);
            }
        }

        write!(formatter, "{}", lines.join("\n"))
    }
}

enum StepResult {
    Continue(Vec<i32>),
    Halt,
}

impl Default for Core {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        self.format_lines(
            formatter,
            |i, _| format!("{:0>6} ", i),
            |i, _| {
                if self.current_warrior().current_pointer() == Some(i as i32) {
                    format!("{:>8}", "; <= PC")
                } else {
                    String::new()
                }
            },
        )
    }
}

impl fmt::Display for Core {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        self.format_lines(formatter, |_, _| String::new(), |_, _| String::new())
    }
}
