//! The supervisor thread: turn-timer authority, board refiller, and the
//! single verifier of claims.
//!
//! Per turn: refill every empty cell from the shuffled pool, then drain
//! the claim channel with a timeout tied to the turn clock (coarse poll
//! far from the deadline, fine poll inside the warning window so the
//! countdown display stays accurate). A claim is verified against the
//! claimant's *current* markers, re-read from the board; the claimant is
//! quiesced while it waits for the verdict, so the view cannot be racing
//! its own mutations.
//!
//! Only the supervisor removes items, touches the pool, or mutates
//! scores. Workers never do.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::core::board::Board;
use crate::core::channels::{ClaimRx, ShutdownFlag, SignalTx};
use crate::core::display::GameDisplay;
use crate::core::rules::ClaimRules;
use crate::types::{CellId, ItemId, RoundPhase, Signal, Verdict, WorkerId};
use crate::{COARSE_POLL_MILLIS, FINE_POLL_MILLIS};

/// Turn clock shape, taken from the game config.
#[derive(Debug, Clone, Copy)]
pub struct TurnTiming {
    /// Full turn length.
    pub turn: Duration,
    /// Warning window at the end of the turn.
    pub warning: Duration,
}

/// Final report of a finished game.
#[derive(Debug, Clone)]
pub struct GameSummary {
    /// All workers holding the maximum score, ties included.
    pub winners: Vec<WorkerId>,
    /// Final score per worker, indexed by id.
    pub scores: Vec<u32>,
    pub high_score: u32,
    /// Rounds played before the position went dead.
    pub rounds: u32,
}

pub struct Supervisor {
    board: Arc<Board>,
    /// Items not yet placed. Supervisor-exclusive; workers never touch it.
    pool: Vec<ItemId>,
    claims: ClaimRx,
    /// Signal channel per worker, indexed by id.
    workers: Vec<SignalTx>,
    scores: Vec<u32>,
    high_score: u32,
    removed: usize,
    display: Arc<dyn GameDisplay>,
    rules: Arc<dyn ClaimRules>,
    shutdown: ShutdownFlag,
    capacity: usize,
    timing: TurnTiming,
    rng: StdRng,
    turn_deadline: Instant,
    rounds: u32,
}

impl Supervisor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        board: Arc<Board>,
        pool: Vec<ItemId>,
        claims: ClaimRx,
        workers: Vec<SignalTx>,
        display: Arc<dyn GameDisplay>,
        rules: Arc<dyn ClaimRules>,
        shutdown: ShutdownFlag,
        capacity: usize,
        timing: TurnTiming,
        seed: Option<u64>,
    ) -> Self {
        let scores = vec![0; workers.len()];
        Self {
            board,
            pool,
            claims,
            workers,
            scores,
            high_score: 0,
            removed: 0,
            display,
            rules,
            shutdown,
            capacity,
            timing,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
            turn_deadline: Instant::now(),
            rounds: 0,
        }
    }

    /// Main loop for the supervisor thread. Returns when the game ends
    /// (no valid claim left anywhere) or shutdown is requested.
    pub fn run(mut self) -> GameSummary {
        info!("supervisor thread starting");
        while !self.should_finish() {
            self.rounds += 1;
            debug!(round = self.rounds, "round starting");
            self.refill_board();
            self.reset_turn_clock();
            self.broadcast(Signal::Phase(RoundPhase::Running));
            self.turn_loop();
            self.broadcast(Signal::Phase(RoundPhase::Intermission));
            self.settle_late_claims();
            self.sweep_board();
        }
        self.sweep_board();
        self.terminate_workers();
        let winners = self.winners();
        self.display.announce_winners(&winners);
        info!(
            rounds = self.rounds,
            high_score = self.high_score,
            removed = self.removed,
            "supervisor thread terminated"
        );
        GameSummary {
            winners,
            scores: self.scores.clone(),
            high_score: self.high_score,
            rounds: self.rounds,
        }
    }

    /// Game over when shutdown was requested or no valid claim exists
    /// across pool and board together.
    fn should_finish(&self) -> bool {
        if self.shutdown.is_triggered() {
            return true;
        }
        let mut items = self.board.items();
        items.extend_from_slice(&self.pool);
        !self.rules.has_claim(&items)
    }

    /// Shuffle the pool and place an item on every empty cell while the
    /// pool lasts.
    fn refill_board(&mut self) {
        self.pool.shuffle(&mut self.rng);
        for cell in self.board.empty_cells() {
            let Some(item) = self.pool.pop() else { break };
            if !self.board.place_item(cell, item) {
                // Cannot happen while placement is supervisor-exclusive.
                self.pool.push(item);
            }
        }
        debug!(
            on_board = self.board.item_count(),
            in_pool = self.pool.len(),
            "board refilled"
        );
    }

    /// Drain claims until the turn clock expires, the position goes
    /// dead, or shutdown is requested.
    fn turn_loop(&mut self) {
        while !self.shutdown.is_triggered() {
            let remaining = self.turn_deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(round = self.rounds, "turn expired");
                break;
            }
            let poll = if remaining > self.timing.warning {
                Duration::from_millis(COARSE_POLL_MILLIS)
            } else {
                Duration::from_millis(FINE_POLL_MILLIS)
            };
            let claim = self.claims.recv_timeout(poll.min(remaining));
            self.update_countdown();
            if let Some(claim) = claim {
                self.settle_claim(claim.worker);
            }
            if self.pool.is_empty() && !self.rules.has_claim(&self.board.items()) {
                debug!(round = self.rounds, "dead position, ending turn early");
                break;
            }
        }
    }

    /// Verify one claim and send the verdict to exactly the claimant.
    ///
    /// The marker set is re-read and re-validated here: a cell whose
    /// item vanished since it was marked (a concurrent claim removed it)
    /// makes the claim stale, which is an invalid claim, not an error.
    /// On the invalid path the claimant's markers are cleared *before*
    /// the verdict goes out, so the same set cannot be resubmitted.
    fn settle_claim(&mut self, worker: WorkerId) {
        let view = self.board.claim_view(worker);
        let cells: Vec<CellId> = view.iter().map(|(cell, _)| *cell).collect();
        let items: Option<Vec<ItemId>> = view.into_iter().map(|(_, item)| item).collect();
        let valid = match &items {
            Some(items) if items.len() == self.capacity => self.rules.is_valid_claim(items),
            _ => false,
        };

        if !valid {
            self.board.clear_markers(worker);
            debug!(%worker, markers = cells.len(), "claim invalid");
            self.workers[worker.0].send(Signal::Verdict(Verdict::Invalid));
            return;
        }

        let refills = self.draw(cells.len());
        let removed = self.board.settle_cells(&cells, refills);
        self.removed += removed.len();
        self.reset_turn_clock();
        self.workers[worker.0].send(Signal::Verdict(Verdict::Valid));
        self.award_point(worker);
        info!(%worker, removed = removed.len(), "claim settled");
    }

    /// Take up to `count` items off the top of the pool.
    fn draw(&mut self, count: usize) -> Vec<ItemId> {
        let take = count.min(self.pool.len());
        self.pool.split_off(self.pool.len() - take)
    }

    fn award_point(&mut self, worker: WorkerId) {
        self.scores[worker.0] += 1;
        let score = self.scores[worker.0];
        self.display.set_score(worker, score);
        if score > self.high_score {
            self.high_score = score;
        }
    }

    /// Claims that arrived after the turn ended still get settled; the
    /// claimants are blocked waiting and must be released before the
    /// sweep invalidates their markers.
    fn settle_late_claims(&mut self) {
        while let Some(claim) = self.claims.try_recv() {
            self.settle_claim(claim.worker);
        }
    }

    /// Round end: every placed item goes back to the pool, all markers
    /// vanish with them.
    fn sweep_board(&mut self) {
        let mut items = self.board.sweep();
        self.pool.append(&mut items);
    }

    fn reset_turn_clock(&mut self) {
        self.turn_deadline = Instant::now() + self.timing.turn;
        self.display.set_countdown(self.timing.turn, false);
    }

    fn update_countdown(&self) {
        let remaining = self.turn_deadline.saturating_duration_since(Instant::now());
        self.display
            .set_countdown(remaining, remaining < self.timing.warning);
    }

    fn broadcast(&self, signal: Signal) {
        for link in &self.workers {
            link.send(signal);
        }
    }

    /// Stop order is deterministic: reverse identity order.
    fn terminate_workers(&self) {
        self.shutdown.trigger();
        for link in self.workers.iter().rev() {
            link.send(Signal::Shutdown);
        }
    }

    fn winners(&self) -> Vec<WorkerId> {
        let top = self.scores.iter().copied().max().unwrap_or(0);
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, score)| **score == top)
            .map(|(id, _)| WorkerId(id))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
