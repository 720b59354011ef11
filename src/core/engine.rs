//! Game assembly: wires the board, channels and threads together.
//!
//! The engine spawns one thread per worker (plus an input generator per
//! synthetic worker) and the supervisor on its own thread. Input senders
//! are handed out through [`GameHandle`] so external sources - tests, or
//! a keyboard mapping layer - can feed events instead of the generators.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::info;

use crate::core::board::Board;
use crate::core::channels::{
    claim_channel, input_channel, signal_channel, InputTx, ShutdownFlag,
};
use crate::core::display::{GameDisplay, TerminalDisplay};
use crate::core::rules::{ClaimRules, FeatureRules};
use crate::core::supervisor::{GameSummary, Supervisor, TurnTiming};
use crate::core::worker::{spawn_generator, Worker};
use crate::types::{ConfigError, GameConfig, ItemId, WorkerId};

/// Builder for one game.
pub struct GameEngine {
    config: GameConfig,
    display: Arc<dyn GameDisplay>,
    rules: Arc<dyn ClaimRules>,
    synthetic: bool,
}

impl GameEngine {
    /// Engine with the stock feature-deck rules and terminal display.
    pub fn new(config: GameConfig) -> Self {
        let rules = FeatureRules::new(
            config.feature_count,
            config.feature_values,
            config.claim_capacity,
        );
        Self {
            config,
            display: Arc::new(TerminalDisplay::new()),
            rules: Arc::new(rules),
            synthetic: true,
        }
    }

    pub fn with_display(mut self, display: Arc<dyn GameDisplay>) -> Self {
        self.display = display;
        self
    }

    pub fn with_rules(mut self, rules: Arc<dyn ClaimRules>) -> Self {
        self.rules = rules;
        self
    }

    /// Skip the auto-input generators; every input event then comes
    /// through [`GameHandle::input`].
    pub fn without_generators(mut self) -> Self {
        self.synthetic = false;
        self
    }

    /// Spawn all threads and start playing.
    pub fn start(self) -> Result<GameHandle, ConfigError> {
        self.config.validate()?;
        let config = self.config;

        let board = Arc::new(Board::new(config.grid_cells, config.workers));
        let shutdown = ShutdownFlag::new();
        let (claim_tx, claim_rx) = claim_channel(config.workers);

        let mut links = Vec::with_capacity(config.workers);
        let mut inputs = Vec::with_capacity(config.workers);
        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let id = WorkerId(id);
            let (signal_tx, signal_rx) = signal_channel();
            let (input_tx, input_rx) = input_channel();
            let generator = self.synthetic.then(|| {
                spawn_generator(
                    id,
                    config.grid_cells,
                    config.input_interval(),
                    input_tx.clone(),
                    shutdown.clone(),
                    config.seed,
                )
            });
            let worker = Worker::new(
                id,
                board.clone(),
                claim_tx.clone(),
                signal_rx,
                input_rx,
                self.display.clone(),
                shutdown.clone(),
                config.claim_capacity,
                config.reward_freeze(),
                config.penalty_freeze(),
            );
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker.run(generator))
                .expect("failed to spawn worker thread");
            links.push(signal_tx);
            inputs.push(input_tx);
            workers.push(handle);
        }

        let pool: Vec<ItemId> = (0..config.deck_size() as u32).map(ItemId).collect();
        let supervisor = Supervisor::new(
            board.clone(),
            pool,
            claim_rx,
            links,
            self.display,
            self.rules,
            shutdown.clone(),
            config.claim_capacity,
            TurnTiming {
                turn: config.turn_duration(),
                warning: config.warning_duration(),
            },
            config.seed,
        );
        let supervisor = thread::Builder::new()
            .name("supervisor".into())
            .spawn(move || supervisor.run())
            .expect("failed to spawn supervisor thread");

        info!(workers = config.workers, "game started");
        Ok(GameHandle {
            board,
            inputs,
            shutdown,
            supervisor,
            workers,
        })
    }

    /// Start and block until the game ends.
    pub fn run(self) -> Result<GameSummary, ConfigError> {
        Ok(self.start()?.wait())
    }
}

/// A running game. Dropping the handle does not stop the game; call
/// [`GameHandle::stop`] or let it play out, then [`GameHandle::wait`].
pub struct GameHandle {
    board: Arc<Board>,
    inputs: Vec<InputTx>,
    shutdown: ShutdownFlag,
    supervisor: JoinHandle<GameSummary>,
    workers: Vec<JoinHandle<()>>,
}

impl GameHandle {
    /// Feed one worker's input queue from outside.
    pub fn input(&self, worker: WorkerId) -> InputTx {
        self.inputs[worker.0].clone()
    }

    /// Read-only view of the shared board (scores and items move under
    /// the board's own lock, so this is always consistent).
    pub fn board(&self) -> Arc<Board> {
        self.board.clone()
    }

    /// Request cooperative shutdown; the supervisor finishes the current
    /// poll, releases every worker and reports the game as it stands.
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    /// Block until the supervisor and every worker thread have exited.
    pub fn wait(self) -> GameSummary {
        let summary = self
            .supervisor
            .join()
            .expect("supervisor thread panicked");
        for handle in self.workers {
            let _ = handle.join();
        }
        summary
    }
}

// =============================================================================
// TESTS
// =============================================================================
