//! Core types for Triplet

mod config;
mod error;
mod ids;
mod message;
mod phase;

pub use config::GameConfig;
pub use error::ConfigError;
pub use ids::{CellId, ItemId, WorkerId};
pub use message::{Claim, RoundPhase, Signal, Verdict};
pub use phase::WorkerPhase;
