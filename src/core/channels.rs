//! Channel plumbing between the supervisor and the workers.
//!
//! - One bounded FIFO claim channel, all workers -> supervisor. One slot
//!   per sender: the protocol allows at most one outstanding claim per
//!   worker, so a `send` can never block.
//! - One signal channel per worker, supervisor -> worker, carrying
//!   verdicts, round-phase changes and the shutdown sentinel.
//! - One bounded input channel per worker for cell-index events.
//!
//! Every blocking receive either has a timeout or is paired with a
//! disconnect/sentinel path, so shutdown is observable at every
//! suspension point without interrupting threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::types::{CellId, Claim, Signal, WorkerId};

/// Events waiting per worker before the producer blocks.
const INPUT_QUEUE_CAPACITY: usize = 16;

/// Process-wide cooperative stop flag, checked at every loop head.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Worker-side handle to the shared claim channel.
#[derive(Debug, Clone)]
pub struct ClaimTx(Sender<Claim>);

/// Supervisor-side handle to the shared claim channel.
#[derive(Debug)]
pub struct ClaimRx(Receiver<Claim>);

/// Build the claim channel; capacity is one slot per worker.
pub fn claim_channel(workers: usize) -> (ClaimTx, ClaimRx) {
    let (tx, rx) = bounded(workers.max(1));
    (ClaimTx(tx), ClaimRx(rx))
}

impl ClaimTx {
    /// Queue "worker X has a full claim". Returns false when the
    /// supervisor is gone (shutdown in progress).
    pub fn submit(&self, worker: WorkerId) -> bool {
        self.0.send(Claim { worker }).is_ok()
    }
}

impl ClaimRx {
    /// Block for the next claim, bounded by the turn clock.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Claim> {
        self.0.recv_timeout(timeout).ok()
    }

    /// Drain without blocking (turn-end settlement of late claims).
    pub fn try_recv(&self) -> Option<Claim> {
        self.0.try_recv().ok()
    }
}

/// Supervisor-side end of one worker's signal channel.
#[derive(Debug)]
pub struct SignalTx(Sender<Signal>);

/// Worker-side end of its signal channel.
#[derive(Debug)]
pub struct SignalRx(Receiver<Signal>);

/// Build one worker's signal channel. Unbounded in the small: at most
/// one verdict plus a handful of phase changes are ever queued.
pub fn signal_channel() -> (SignalTx, SignalRx) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (SignalTx(tx), SignalRx(rx))
}

impl SignalTx {
    /// Fire-and-forget; a worker that already exited is not an error.
    pub fn send(&self, signal: Signal) {
        let _ = self.0.send(signal);
    }
}

impl SignalRx {
    /// Block for the next signal. A disconnected supervisor reads as
    /// `Shutdown`, so a worker awaiting a verdict can always unblock.
    pub fn recv(&self) -> Signal {
        self.0.recv().unwrap_or(Signal::Shutdown)
    }

    /// Raw receiver for `select!` in the worker event loop.
    pub(crate) fn inner(&self) -> &Receiver<Signal> {
        &self.0
    }
}

/// Producer end of one worker's input-event queue. Human sources hold a
/// clone of this; synthetic generators get one of their own.
pub type InputTx = Sender<CellId>;

/// Worker-side end of its input-event queue.
pub type InputRx = Receiver<CellId>;

/// Build one worker's input queue.
pub fn input_channel() -> (InputTx, InputRx) {
    bounded(INPUT_QUEUE_CAPACITY)
}

// =============================================================================
// TESTS
// =============================================================================
