//! Focus Battle headless runner.
//!
//! - `run`: plays one demo match, logging announcer callouts, and prints the
//!   final standings
//! - `sweep`: plays many seeded matches in parallel and totals round wins
//!   and draws per player
//!
//! Logging goes through `tracing`; set `RUST_LOG` to filter and
//! `LOG_FORMAT=json` for JSON lines.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use focus_battle_core::announcer::Announcer;
use focus_battle_core::driver::{MatchDriver, TickReport};
use focus_battle_core::leaderboard::{standings, Standing};
use focus_battle_core::signal::DemoFeed;
use focus_battle_core::{
    CombatConfig, CombatEngine, CombatEvent, DemoFeedConfig, DriverConfig, PlayerIdentity,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "focus-battle")]
#[command(about = "Run headless Focus Battle matches on the demo signal feed")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one match and print the standings
    Run(RunArgs),
    /// Play many seeded matches in parallel and total the results
    Sweep(SweepArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Demo feed seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Match length in seconds
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Frame length in milliseconds
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f32,

    /// Combat tuning JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every event and the standings as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct SweepArgs {
    /// Number of matches
    #[arg(long, default_value_t = 100)]
    matches: u64,

    /// Seed of the first match; match `i` uses `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Length of each match in seconds
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Combat tuning JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

/// One event line of `run --json` output.
#[derive(Serialize)]
struct EventLine<'a> {
    at: f32,
    #[serde(flatten)]
    event: &'a CombatEvent,
}

/// Round wins per roster slot and draws, summed over matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tally {
    matches: u64,
    round_wins: Vec<u32>,
    draws: u32,
}

impl Tally {
    fn merge(mut self, other: Self) -> Self {
        if self.round_wins.len() < other.round_wins.len() {
            self.round_wins.resize(other.round_wins.len(), 0);
        }
        for (total, wins) in self.round_wins.iter_mut().zip(&other.round_wins) {
            *total += wins;
        }
        self.matches += other.matches;
        self.draws += other.draws;
        self
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Run(args) => run(&args),
        Command::Sweep(args) => sweep(&args),
    }
}

fn roster() -> Vec<PlayerIdentity> {
    vec![
        PlayerIdentity::new(1, "Mark", "#00c9ff"),
        PlayerIdentity::new(2, "Jessica", "#ff43a6"),
    ]
}

fn load_config(path: Option<&Path>) -> Result<CombatConfig> {
    let Some(path) = path else {
        return Ok(CombatConfig::default());
    };
    CombatConfig::from_path(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn build_driver(config: CombatConfig, seed: u64) -> Result<MatchDriver> {
    let engine = CombatEngine::try_new(config)?;
    let state = engine.initialize(&roster())?;
    let ids: Vec<_> = state.players().iter().map(|p| p.id()).collect();
    let feed = DemoFeed::new(&ids, DemoFeedConfig::default(), seed)?;
    Ok(MatchDriver::new(
        engine,
        state,
        Box::new(feed),
        DriverConfig::default(),
    )?)
}

// =============================================================================
// run
// =============================================================================

fn run(args: &RunArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = load_config(args.config.as_deref())?;
    let mut driver = build_driver(config, seed)?;

    let announcer = Arc::new(Mutex::new(Announcer::new(driver.state())));
    driver.add_consumer(Box::new(Arc::clone(&announcer)));

    info!(seed, seconds = args.seconds, "match started");
    let reports = driver
        .run_for(args.seconds, args.frame_ms / 1000.0)
        .context("match aborted")?;
    info!(ticks = driver.ticks(), "match finished");

    let table = standings(driver.state());
    if args.json {
        print_event_lines(&reports)?;
        for standing in &table {
            println!("{}", serde_json::to_string(standing)?);
        }
    } else {
        print_table(&table);
        let announcer = announcer
            .lock()
            .map_err(|_| anyhow::anyhow!("announcer lock poisoned"))?;
        println!();
        for entry in announcer.history().take(5) {
            println!("[{:>7.2}s] {}", entry.at, entry.message);
        }
    }
    Ok(())
}

fn print_event_lines(reports: &[TickReport]) -> Result<()> {
    let mut at = 0.0_f32;
    for report in reports {
        at += report.dt;
        for event in &report.events {
            println!("{}", serde_json::to_string(&EventLine { at, event })?);
        }
    }
    Ok(())
}

fn print_table(table: &[Standing]) {
    println!(
        "{:<4} {:<12} {:>6} {:>7} {:>7} {:>7}",
        "#", "player", "wins", "hp", "focus", "αΘ"
    );
    for row in table {
        println!(
            "{:<4} {:<12} {:>6} {:>7.1} {:>6.0}% {:>6.0}%",
            row.rank,
            row.name,
            row.round_wins,
            row.hp,
            row.focus * 100.0,
            row.alpha_theta * 100.0
        );
    }
}

// =============================================================================
// sweep
// =============================================================================

fn sweep(args: &SweepArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    info!(matches = args.matches, seed = args.seed, "sweep started");

    let tallies = (0..args.matches)
        .into_par_iter()
        .map(|i| play_match(config, args.seed.wrapping_add(i), args.seconds))
        .collect::<Result<Vec<_>>>()?;
    let total = tallies.into_iter().fold(Tally::default(), Tally::merge);

    println!("matches: {}", total.matches);
    for (identity, wins) in roster().iter().zip(&total.round_wins) {
        println!("{}: {wins} round wins", identity.name);
    }
    println!("draws: {}", total.draws);
    Ok(())
}

fn play_match(config: CombatConfig, seed: u64, seconds: f32) -> Result<Tally> {
    let mut driver = build_driver(config, seed)?;
    let frame_dt = DriverConfig::default().min_frame_secs();
    let reports = driver
        .run_for(seconds, frame_dt)
        .with_context(|| format!("match with seed {seed} aborted"))?;

    let draws = reports
        .iter()
        .filter(|r| matches!(r.outcome(), Some(CombatEvent::Draw)))
        .count();

    Ok(Tally {
        matches: 1,
        round_wins: driver.state().players().iter().map(|p| p.round_wins).collect(),
        draws: u32::try_from(draws)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["focus-battle", "run", "--seed", "7", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Run(RunArgs {
                seed: Some(7),
                json: true,
                ..
            })
        ));

        let cli = Cli::try_parse_from(["focus-battle", "sweep", "--matches", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Sweep(SweepArgs { matches: 3, .. })));
    }

    #[test]
    fn tally_merge_sums_per_slot() {
        let a = Tally {
            matches: 1,
            round_wins: vec![2, 1],
            draws: 0,
        };
        let b = Tally {
            matches: 1,
            round_wins: vec![0, 3],
            draws: 1,
        };
        let total = Tally::default().merge(a).merge(b);
        assert_eq!(total.matches, 2);
        assert_eq!(total.round_wins, vec![2, 4]);
        assert_eq!(total.draws, 1);
    }

    #[test]
    fn play_match_is_repeatable() {
        let config = CombatConfig::default();
        let first = play_match(config, 11, 30.0).unwrap();
        let second = play_match(config, 11, 30.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.round_wins.len(), 2);
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = load_config(Some(Path::new("/nonexistent/focus.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/focus.json"));
    }
}
