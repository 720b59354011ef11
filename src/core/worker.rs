//! Worker threads.
//!
//! Each worker runs an event loop over two channels: its input queue
//! (cell indices) and its signal channel (verdicts, phase changes,
//! shutdown). Marking toggles go straight to the shared board; when the
//! marker set reaches capacity the worker submits a claim and blocks on
//! its signal channel until the supervisor answers.
//!
//! Synthetic workers pair the event loop with a generator thread that
//! produces random cell indices at a bounded rate, independent of the
//! worker's processing pace.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, SendTimeoutError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::core::board::{Board, MarkOutcome};
use crate::core::channels::{ClaimTx, InputRx, InputTx, ShutdownFlag, SignalRx};
use crate::core::display::GameDisplay;
use crate::types::{CellId, RoundPhase, Signal, Verdict, WorkerId, WorkerPhase};
use crate::DISPLAY_TICK_MILLIS;

/// One worker's state and channel ends. Consumed by [`Worker::run`] on
/// the worker's own thread.
pub struct Worker {
    id: WorkerId,
    board: Arc<Board>,
    claims: ClaimTx,
    signals: SignalRx,
    input: InputRx,
    display: Arc<dyn GameDisplay>,
    shutdown: ShutdownFlag,
    capacity: usize,
    reward_freeze: Duration,
    penalty_freeze: Duration,
    phase: WorkerPhase,
    round: RoundPhase,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: WorkerId,
        board: Arc<Board>,
        claims: ClaimTx,
        signals: SignalRx,
        input: InputRx,
        display: Arc<dyn GameDisplay>,
        shutdown: ShutdownFlag,
        capacity: usize,
        reward_freeze: Duration,
        penalty_freeze: Duration,
    ) -> Self {
        Self {
            id,
            board,
            claims,
            signals,
            input,
            display,
            shutdown,
            capacity,
            reward_freeze,
            penalty_freeze,
            phase: WorkerPhase::Idle,
            // The supervisor broadcasts Running when the first turn starts.
            round: RoundPhase::Intermission,
        }
    }

    /// Main loop for the worker thread. Joins the owning generator (if
    /// any) only after this worker has stopped consuming input.
    pub fn run(mut self, generator: Option<JoinHandle<()>>) {
        info!(worker = %self.id, "worker thread starting");
        let signals = self.signals.inner().clone();
        let input = self.input.clone();
        while !self.shutdown.is_triggered() {
            select! {
                recv(signals) -> msg => match msg.unwrap_or(Signal::Shutdown) {
                    Signal::Phase(phase) => self.round = phase,
                    Signal::Shutdown => break,
                    // No claim is outstanding here; a verdict cannot
                    // pair with anything. Drop it.
                    Signal::Verdict(_) => {}
                },
                recv(input) -> event => match event {
                    Ok(cell) => self.on_input_event(cell),
                    Err(_) => break,
                },
            }
        }
        if let Some(handle) = generator {
            let _ = handle.join();
        }
        info!(worker = %self.id, "worker thread terminated");
    }

    /// React to one input event. Invalid events (empty cell, capacity
    /// overrun, out-of-range index) are ignored, never fatal.
    fn on_input_event(&mut self, cell: CellId) {
        if self.round == RoundPhase::Intermission {
            return;
        }
        match self.board.toggle_mark(self.id, cell, self.capacity) {
            MarkOutcome::Marked(count) if count == self.capacity => {
                trace!(worker = %self.id, %cell, "marker set full, submitting claim");
                self.await_verdict();
            }
            MarkOutcome::Marked(_) => self.set_phase(WorkerPhase::Accumulating),
            MarkOutcome::Unmarked => {
                let phase = if self.board.marked_count(self.id) == 0 {
                    WorkerPhase::Idle
                } else {
                    WorkerPhase::Accumulating
                };
                self.set_phase(phase);
            }
            MarkOutcome::Rejected => {
                trace!(worker = %self.id, %cell, "input event ignored");
            }
        }
    }

    /// Submit a claim and block until the verdict (or shutdown) arrives.
    /// The supervisor has already cleared this worker's markers on the
    /// invalid path, so the same set cannot be resubmitted.
    fn await_verdict(&mut self) {
        self.set_phase(WorkerPhase::AwaitingVerdict);
        if !self.claims.submit(self.id) {
            // Supervisor gone; the loop head observes shutdown.
            return;
        }
        loop {
            match self.signals.recv() {
                Signal::Verdict(Verdict::Valid) => {
                    debug!(worker = %self.id, "claim valid");
                    self.freeze(self.reward_freeze);
                    return;
                }
                Signal::Verdict(Verdict::Invalid) => {
                    debug!(worker = %self.id, "claim invalid");
                    self.freeze(self.penalty_freeze);
                    return;
                }
                Signal::Phase(phase) => self.round = phase,
                Signal::Shutdown => return,
            }
        }
    }

    /// Suspend until the deadline, refreshing the freeze display each
    /// tick. Input that arrived while frozen (or while awaiting the
    /// verdict) is discarded, not deferred.
    fn freeze(&mut self, duration: Duration) {
        self.set_phase(WorkerPhase::Frozen);
        let deadline = Instant::now() + duration;
        let tick = Duration::from_millis(DISPLAY_TICK_MILLIS);
        loop {
            if self.shutdown.is_triggered() {
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.display.set_freeze(self.id, remaining);
            thread::sleep(remaining.min(tick));
        }
        self.display.set_freeze(self.id, Duration::ZERO);
        while self.input.try_recv().is_ok() {}
        let phase = if self.board.marked_count(self.id) == 0 {
            WorkerPhase::Idle
        } else {
            WorkerPhase::Accumulating
        };
        self.set_phase(phase);
    }

    fn set_phase(&mut self, phase: WorkerPhase) {
        if phase != self.phase {
            self.phase = phase;
            debug!(worker = %self.id, %phase, "worker phase");
        }
    }
}

/// Spawn the auto-input generator for a synthetic worker: random cell
/// indices at a bounded rate. Stops when the shutdown flag is raised or
/// the worker's queue is gone; a full queue drops the event rather than
/// blocking past one interval.
pub fn spawn_generator(
    worker: WorkerId,
    cells: usize,
    interval: Duration,
    tx: InputTx,
    shutdown: ShutdownFlag,
    seed: Option<u64>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("generator-{}", worker))
        .spawn(move || {
            info!(worker = %worker, "input generator starting");
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker.0 as u64)),
                None => StdRng::from_entropy(),
            };
            while !shutdown.is_triggered() {
                let cell = CellId(rng.gen_range(0..cells));
                if let Err(SendTimeoutError::Disconnected(_)) = tx.send_timeout(cell, interval) {
                    break;
                }
                thread::sleep(interval);
            }
            info!(worker = %worker, "input generator terminated");
        })
        .expect("failed to spawn generator thread")
}

// =============================================================================
// TESTS
// =============================================================================
