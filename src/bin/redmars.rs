use std::{
    collections::HashMap,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use log::debug;
use structopt::StructOpt;

use redmars::{
    core::{BattleResult, Core, CoreConfig},
    load_file::Warrior,
    parser,
};

lazy_static! {
    static ref IO_SENTINEL: PathBuf = PathBuf::from("-");
}

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab")]
/// Run Redcode warriors against each other in a Memory Array Redcode Simulator
struct Options {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Run one or more warriors to completion
    Run {
        /// The number of rounds to battle. Defaults to 1.
        #[structopt(long, short = "r")]
        rounds: Option<i32>,

        /// The size of the core. Defaults to 8,000.
        #[structopt(long, short = "s")]
        core_size: Option<i32>,

        /// The maximum number of cycles to run. Defaults to 10,000.
        #[structopt(long, short = "c")]
        max_cycles: Option<i32>,

        /// The maximum number of processes per warrior. Defaults to 10,000.
        #[structopt(long, short = "p")]
        max_processes: Option<i32>,

        /// The maximum size of a warrior. Defaults to 100.
        #[structopt(long, short = "l")]
        max_warrior_length: Option<i32>,

        /// The minimum separation distance between warriors. Defaults to 1,000.
        #[structopt(long, short = "d")]
        min_distance: Option<i32>,

        /// Input files; use "-" to read from stdin
        #[structopt(long, short, parse(from_os_str))]
        warrior: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let options = Options::from_args();

    match options.command {
        Command::Run {
            rounds,
            core_size,
            max_cycles,
            max_processes,
            max_warrior_length,
            min_distance,
            warrior,
        } => run(
            rounds,
            core_size,
            max_cycles,
            max_processes,
            max_warrior_length,
            min_distance,
            &warrior,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    rounds: Option<i32>,
    core_size: Option<i32>,
    max_cycles: Option<i32>,
    max_processes: Option<i32>,
    max_warrior_length: Option<i32>,
    min_distance: Option<i32>,
    warrior_paths: &[PathBuf],
) -> Result<()> {
    let warriors = warrior_paths
        .iter()
        .map(|path| parse_warrior(path.as_path()))
        .collect::<Result<Vec<Warrior>>>()?;

    if warriors.is_empty() {
        return Err(anyhow!("no warriors given; pass at least one --warrior"));
    }

    let mut config = CoreConfig::default();
    if let Some(core_size) = core_size {
        config.core_size = core_size;
    }
    if let Some(max_cycles) = max_cycles {
        config.max_cycles = max_cycles;
    }
    if let Some(max_processes) = max_processes {
        config.max_processes = max_processes;
    }
    if let Some(max_warrior_length) = max_warrior_length {
        config.max_warrior_length = max_warrior_length;
    }
    if let Some(min_distance) = min_distance {
        config.min_distance = min_distance;
    }

    let mut scores: HashMap<usize, (i32, i32, i32)> = HashMap::with_capacity(warriors.len());
    let names: Vec<&str> = warriors.iter().map(|w| w.name.as_str()).collect();

    let rounds = rounds.unwrap_or(1);
    for round in 0..rounds {
        let mut core = Core::new(CoreConfig {
            core_size: config.core_size,
            max_cycles: config.max_cycles,
            max_processes: config.max_processes,
            max_warrior_length: config.max_warrior_length,
            min_distance: config.min_distance,
        });
        core.load_warriors(&warriors)?;

        let results = core.run();
        debug!("round {}: battle lasted {} steps", round, core.steps_taken());

        for (id, result) in results.into_iter().enumerate() {
            let score = scores.entry(id).or_insert((0, 0, 0));
            match result {
                BattleResult::Win => score.0 += 1,
                BattleResult::Loss => score.1 += 1,
                BattleResult::Tie => score.2 += 1,
            }
            debug!("{}: {}", names[id], result);
        }
    }

    for (id, name) in names.iter().enumerate() {
        let (win, loss, tie) = scores.get(&id).copied().unwrap_or_default();
        println!("{}: {} {} {}", name, win, loss, tie);
    }

    Ok(())
}

fn parse_warrior(path: &Path) -> Result<Warrior> {
    let input = if path == Path::new(IO_SENTINEL.as_path()) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)?
    };

    parser::parse(&input)
        .map_err(|err| anyhow!("parse failed: {}", err))?
        .ok_or_else(|| anyhow!("{}: warrior has no instructions", path.display()))
}
