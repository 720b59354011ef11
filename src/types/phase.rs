//! Worker lifecycle states.

/// The observable states of one worker thread.
///
/// `Frozen` is entered after every verdict (reward or penalty duration);
/// input events that arrive while frozen are discarded, not deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// No markers placed.
    Idle,
    /// 1..capacity-1 markers placed.
    Accumulating,
    /// Capacity reached, claim submitted, blocked on the signal channel.
    AwaitingVerdict,
    /// Ignoring input until a deadline elapses.
    Frozen,
}

impl std::fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerPhase::Idle => "IDLE",
            WorkerPhase::Accumulating => "ACCUMULATING",
            WorkerPhase::AwaitingVerdict => "AWAITING_VERDICT",
            WorkerPhase::Frozen => "FROZEN",
        };
        write!(f, "{}", name)
    }
}
