//! Headless battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Both headline numbers for a map
//! cavern solve --input cavern.txt
//!
//! # One battle with custom attack powers, printing the final map
//! cavern run --input cavern.txt --elf-attack 15 --show-map
//!
//! # Flawless goblin boost, 8 worker threads, JSON output
//! cavern boost --scenario duel.ron --faction goblin --parallel 8 --format json
//!
//! # Determinism check
//! cavern verify --input cavern.txt --runs 10
//! ```
//!
//! Reports go to stdout; logs go to stderr.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cavern_core::unit::Faction;
use cavern_headless::{runner, OutputFormat, Report, RunnerError, Scenario, ScenarioError};

#[derive(Parser)]
#[command(name = "cavern")]
#[command(about = "Turn-based cavern combat simulator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the battlefield comes from.
#[derive(Args)]
struct InputArgs {
    /// Plain map file
    #[arg(short, long, required_unless_present = "scenario", conflicts_with = "scenario")]
    input: Option<PathBuf>,

    /// RON scenario file
    #[arg(short, long)]
    scenario: Option<PathBuf>,
}

impl InputArgs {
    fn load(&self) -> Result<Scenario, RunnerError> {
        let scenario = match (&self.scenario, &self.input) {
            (Some(path), _) => Scenario::load(path)?,
            (None, Some(path)) => Scenario::from_map_file(path)?,
            (None, None) => {
                return Err(ScenarioError::FileNotFound("no --input or --scenario given".into()).into())
            }
        };
        Ok(scenario)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default outcome and the flawless elf outcome
    Solve {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Fight one battle to the end
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Elf attack power (overrides the scenario)
        #[arg(long)]
        elf_attack: Option<u32>,

        /// Goblin attack power (overrides the scenario)
        #[arg(long)]
        goblin_attack: Option<u32>,

        /// Fail if the battle lasts longer than this many rounds
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Print the battlefield after the last round
        #[arg(long)]
        show_map: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Find the smallest attack power that wins without losses
    Boost {
        #[command(flatten)]
        input: InputArgs,

        /// Faction to boost (defaults to the scenario's favored faction)
        #[arg(long)]
        faction: Option<Faction>,

        /// Evaluate candidate powers on this many threads (0 = auto)
        #[arg(short, long)]
        parallel: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Verify determinism by fighting the same battle multiple times
    Verify {
        #[command(flatten)]
        input: InputArgs,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match execute(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a subcommand and print its report. Returns `false` when the command
/// ran but its check failed.
fn execute(command: Commands) -> Result<bool, RunnerError> {
    match command {
        Commands::Solve { input, format } => {
            let report = runner::solve(&input.load()?)?;
            println!("{}", report.render(format)?);
            Ok(true)
        }
        Commands::Run {
            input,
            elf_attack,
            goblin_attack,
            max_rounds,
            show_map,
            format,
        } => {
            let mut scenario = input.load()?;
            if let Some(power) = elf_attack {
                scenario.attack_powers = scenario.attack_powers.with(Faction::Elf, power);
            }
            if let Some(power) = goblin_attack {
                scenario.attack_powers = scenario.attack_powers.with(Faction::Goblin, power);
            }
            if max_rounds.is_some() {
                scenario.round_limit = max_rounds;
            }

            let report = runner::run(&scenario, show_map)?;
            println!("{}", report.render(format)?);
            Ok(true)
        }
        Commands::Boost {
            input,
            faction,
            parallel,
            format,
        } => {
            let scenario = input.load()?;
            let faction = faction.unwrap_or(scenario.favored);
            let report = runner::boost(&scenario, faction, parallel)?;
            println!("{}", report.render(format)?);
            Ok(true)
        }
        Commands::Verify {
            input,
            runs,
            format,
        } => {
            let report = runner::verify(&input.load()?, runs)?;
            println!("{}", report.render(format)?);
            Ok(report.deterministic)
        }
    }
}
