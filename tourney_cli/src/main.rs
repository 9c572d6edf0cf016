//! Command-line front-end for running competitions.
//!
//! Each invocation loads the JSON snapshot, runs one command against it and
//! writes the snapshot back when the command changed anything.

mod commands;
mod config;
mod storage;

use std::path::PathBuf;

use anyhow::{Context, Error};
use log::{info, warn};
use pico_args::Arguments;
use rand::{SeedableRng, rngs::StdRng};

use commands::Command;
use config::CliConfig;

const HELP: &str = "\
Manage football, futsal, fut7 and society competitions

USAGE:
  tourney_cli <COMMAND> [ARGS] [OPTIONS]

COMMANDS:
  new-competition NAME --format FORMAT [--kind KIND]
                             Create a competition (FORMAT: groups_knockout | round_robin,
                             KIND: football | futsal | fut7 | society)
  add-team COMPETITION NAME  Register a team
  add-player TEAM NAME       Add a player to a team roster
  draw-groups COMPETITION --groups G --per-group P
                             Draw groups and schedule every group's matches
  round-robin COMPETITION    Schedule a single league round-robin
  record MATCH S1 S2 [--date YYYY-MM-DD] [--event TYPE:PLAYER[:MINUTE]]...
                             Record a result (scores 0-99, TYPE: goal | yellow | red)
  knockout COMPETITION --size N
                             Seed the first knockout round (N: 2, 4, 8, 16 or 32)
  qualifiers COMPETITION     Show the qualifiers of every finished group
  standings COMPETITION [--group GROUP]
                             Recalculate and print standings
  fixtures COMPETITION       List matches
  stats COMPETITION          Top scorers, discipline and goalkeeping tables
  counters COMPETITION       Recompute per-player competition counters

OPTIONS:
  --data       FILE          Snapshot file  [default: env TOURNEY_DATA_FILE or data.json]
  --seed       N             Seed for draws and shuffles  [default: env TOURNEY_SEED or random]

FLAGS:
  -h, --help                 Print help information

ENVIRONMENT:
  TOURNEY_DATA_FILE          Snapshot file
  TOURNEY_SEED               Random seed
  RUST_LOG                   Log level (default: info)
  (A .env file in the working directory is loaded if present)
";

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let Some(name) = pargs.subcommand()? else {
        print!("{HELP}");
        std::process::exit(2);
    };

    let data_override: Option<PathBuf> = pargs.opt_value_from_str("--data")?;
    let seed_override: Option<u64> = pargs.opt_value_from_str("--seed")?;
    let config = CliConfig::from_env(data_override, seed_override)?;
    config.validate()?;

    let command = Command::parse(&name, &mut pargs)?;
    let leftover = pargs.finish();
    if !leftover.is_empty() {
        warn!("Ignoring unused arguments: {leftover:?}");
    }

    let mut rng = match config.seed {
        Some(seed) => {
            info!("Using seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let mut store = storage::load(&config.data_file)?;
    let mutates = command.mutates();
    let output = command
        .execute(&mut store, &mut rng)
        .with_context(|| format!("{name} failed"))?;

    if mutates {
        storage::save(&config.data_file, &store)?;
    }

    print!("{output}");
    Ok(())
}
