//! Values exchanged between supervisor and workers.
//!
//! A `Claim` travels worker -> supervisor on the shared FIFO claim
//! channel. Everything the supervisor says back travels on that worker's
//! own signal channel as a `Signal`. There is no shared mutable "pending
//! claim" field anywhere; the channels carry the full context as values.

use crate::types::WorkerId;

/// A worker's request to verify its currently marked cells.
///
/// At most one claim per worker is in flight: the worker blocks on its
/// signal channel immediately after submitting and cannot mark again
/// until the verdict arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub worker: WorkerId,
}

/// The supervisor's answer to a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The marked cells held a valid combination; reward freeze follows.
    Valid,
    /// Predicate failed, or the marker set went stale before
    /// verification; penalty freeze follows.
    Invalid,
}

/// Per-round phase, owned by the supervisor and broadcast to workers;
/// input gating needs no shared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Turn clock running; input events are accepted.
    Running,
    /// Between rounds (sweep + reshuffle); input events are dropped.
    Intermission,
}

/// Messages delivered on a worker's signal channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Verdict(Verdict),
    Phase(RoundPhase),
    /// Termination sentinel; unblocks a worker waiting for a verdict.
    Shutdown,
}
