//! CLI frontend for the battlefield engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "battlefield",
    about = "Run and inspect 2D battlefield duels",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted duel and report the outcome
    Duel {
        /// Scenario file (default: the built-in ninja-versus-knight duel)
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Virtual run time in milliseconds (default: the scenario's)
        #[arg(short, long)]
        duration_ms: Option<u64>,

        /// RNG seed, overriding the scenario's
        #[arg(short, long)]
        seed: Option<u64>,

        /// Show the full event log, including steps and frames
        #[arg(short, long)]
        verbose: bool,

        /// Print the final snapshot as JSON instead of tables
        #[arg(long, conflicts_with = "realtime")]
        json: bool,

        /// Pace the run against wall-clock time and stream events
        #[arg(long)]
        realtime: bool,
    },

    /// Show the combat stat presets
    Presets,

    /// Throw one projectile and trace it until it settles
    Throw {
        /// Initial horizontal speed (default: drawn from the launcher)
        #[arg(long, allow_hyphen_values = true)]
        vx: Option<f64>,

        /// Initial vertical speed, negative is upwards
        #[arg(long, allow_hyphen_values = true)]
        vy: Option<f64>,

        /// Launch x coordinate
        #[arg(long, default_value = "100")]
        x: f64,

        /// Launch y coordinate
        #[arg(long, default_value = "300")]
        y: f64,

        /// RNG seed for the velocity draw
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Write the default scenario to a JSON file
    Init {
        /// Destination file
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Duel {
            scenario,
            duration_ms,
            seed,
            verbose,
            json,
            realtime,
        } => commands::duel::run(commands::duel::DuelOptions {
            scenario,
            duration_ms,
            seed,
            verbose,
            json,
            realtime,
        }),
        Commands::Presets => commands::presets::run(),
        Commands::Throw { vx, vy, x, y, seed } => commands::throw::run(vx, vy, x, y, seed),
        Commands::Init { file } => commands::init::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
