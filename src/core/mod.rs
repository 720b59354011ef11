//! Core modules for Triplet

pub mod board;
pub mod channels;
pub mod display;
pub mod engine;
pub mod rules;
pub mod supervisor;
pub mod worker;

pub use board::{Board, MarkOutcome};
pub use channels::{
    claim_channel, input_channel, signal_channel, ClaimRx, ClaimTx, InputRx, InputTx,
    ShutdownFlag, SignalRx, SignalTx,
};
pub use display::{GameDisplay, NullDisplay, TerminalDisplay};
pub use engine::{GameEngine, GameHandle};
pub use rules::{ClaimRules, FeatureRules};
pub use supervisor::{GameSummary, Supervisor, TurnTiming};
pub use worker::{spawn_generator, Worker};
