//! Triplet CLI
//!
//! Usage:
//!   triplet                          # 2 synthetic workers, default rules
//!   triplet --workers 4              # more workers
//!   triplet --config game.json      # load tuning from a JSON file
//!   triplet --seed 7 --turn-secs 30  # reproducible, shorter turns

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use triplet::core::{GameEngine, TerminalDisplay};
use triplet::types::GameConfig;
use triplet::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "triplet",
    version = VERSION,
    about = "Concurrent claim-matching table game",
    long_about = "One supervisor thread deals items onto a shared board and verifies\n\
                  claims; N worker threads race to mark valid combinations.\n\n\
                  Workers are synthetic (auto-input) in this binary; the engine also\n\
                  accepts externally fed input queues through its library API."
)]
struct Args {
    /// Number of worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Turn length in seconds
    #[arg(short, long)]
    turn_secs: Option<u64>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<String>,

    /// Fixed RNG seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    let mut config = match &args.config {
        Some(path) => match GameConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("config error: {}", err);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(secs) = args.turn_secs {
        config.turn_millis = secs * 1000;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    println!("triplet v{} - {} workers, {} cells", VERSION, config.workers, config.grid_cells);

    let engine = GameEngine::new(config).with_display(Arc::new(TerminalDisplay::new()));
    match engine.run() {
        Ok(summary) => {
            println!();
            println!("game over after {} round(s)", summary.rounds);
            for (id, score) in summary.scores.iter().enumerate() {
                println!("  worker {}: {}", id, score);
            }
        }
        Err(err) => {
            eprintln!("config error: {}", err);
            std::process::exit(1);
        }
    }
}
