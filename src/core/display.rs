//! Display collaborators.
//!
//! Fire-and-forget: the core never consumes a return value from the
//! display, so implementations are free to drop updates. `NullDisplay`
//! is the test stand-in.

use std::time::Duration;

use colored::Colorize;

use crate::types::WorkerId;

/// Everything the core tells the outside world.
pub trait GameDisplay: Send + Sync {
    /// Turn countdown; `warn` is set inside the warning window.
    fn set_countdown(&self, remaining: Duration, warn: bool);

    /// A worker's score changed.
    fn set_score(&self, worker: WorkerId, score: u32);

    /// A worker's freeze countdown; zero means thawed.
    fn set_freeze(&self, worker: WorkerId, remaining: Duration);

    /// Game over; all maximal-score workers, ties included.
    fn announce_winners(&self, winners: &[WorkerId]);
}

/// Terminal display used by the CLI binary.
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl GameDisplay for TerminalDisplay {
    fn set_countdown(&self, remaining: Duration, warn: bool) {
        let secs = remaining.as_secs_f64();
        let line = format!("turn: {:6.2}s", secs);
        if warn {
            println!("{}", line.red().bold());
        } else {
            println!("{}", line.dimmed());
        }
    }

    fn set_score(&self, worker: WorkerId, score: u32) {
        println!("{}", format!("worker {} score: {}", worker, score).green());
    }

    fn set_freeze(&self, worker: WorkerId, remaining: Duration) {
        if remaining.is_zero() {
            println!("{}", format!("worker {} thawed", worker).dimmed());
        } else {
            println!(
                "{}",
                format!("worker {} frozen: {:.1}s", worker, remaining.as_secs_f64()).yellow()
            );
        }
    }

    fn announce_winners(&self, winners: &[WorkerId]) {
        let ids: Vec<String> = winners.iter().map(|w| w.to_string()).collect();
        println!("{}", format!("winners: {}", ids.join(", ")).bold());
    }
}

/// Discards everything; used by tests and headless runs.
#[derive(Debug, Default)]
pub struct NullDisplay;

impl GameDisplay for NullDisplay {
    fn set_countdown(&self, _remaining: Duration, _warn: bool) {}
    fn set_score(&self, _worker: WorkerId, _score: u32) {}
    fn set_freeze(&self, _worker: WorkerId, _remaining: Duration) {}
    fn announce_winners(&self, _winners: &[WorkerId]) {}
}
