//! End-to-end games through the engine: scripted input queues, no
//! generators, a recording display where the scenario needs to observe
//! freeze/score traffic.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use triplet::core::{ClaimRules, GameDisplay, GameEngine, NullDisplay};
use triplet::types::{CellId, GameConfig, ItemId, WorkerId};

/// Rules scripted by the test: exactly one valid combination, registered
/// once the test has seen which items landed on which cells. Before
/// registration the position counts as "alive" so the game does not end
/// under the test's feet.
struct ScriptedRules {
    valid: Mutex<Option<Vec<ItemId>>>,
}

impl ScriptedRules {
    fn undecided() -> Self {
        Self {
            valid: Mutex::new(None),
        }
    }

    fn register(&self, mut items: Vec<ItemId>) {
        items.sort();
        *self.valid.lock().unwrap() = Some(items);
    }
}

impl ClaimRules for ScriptedRules {
    fn is_valid_claim(&self, items: &[ItemId]) -> bool {
        let mut sorted = items.to_vec();
        sorted.sort();
        self.valid.lock().unwrap().as_deref() == Some(&sorted[..])
    }

    fn count_claims(&self, items: &[ItemId], limit: usize) -> usize {
        match self.valid.lock().unwrap().as_ref() {
            Some(valid) => usize::from(valid.iter().all(|item| items.contains(item))).min(limit),
            None => 1.min(limit),
        }
    }
}

/// Captures freeze and score calls so scenarios can assert on them.
#[derive(Default)]
struct RecordingDisplay {
    freezes: Mutex<Vec<(WorkerId, Duration)>>,
    scores: Mutex<Vec<(WorkerId, u32)>>,
}

impl GameDisplay for RecordingDisplay {
    fn set_countdown(&self, _remaining: Duration, _warn: bool) {}
    fn set_score(&self, worker: WorkerId, score: u32) {
        self.scores.lock().unwrap().push((worker, score));
    }
    fn set_freeze(&self, worker: WorkerId, remaining: Duration) {
        self.freezes.lock().unwrap().push((worker, remaining));
    }
    fn announce_winners(&self, _winners: &[WorkerId]) {}
}

fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for {}", what);
}

fn scripted_config(workers: usize, pool_items: usize) -> GameConfig {
    GameConfig {
        workers,
        pool_items: Some(pool_items),
        turn_millis: 5_000,
        warning_millis: 100,
        reward_freeze_millis: 10,
        penalty_freeze_millis: 10,
        seed: Some(3),
        ..GameConfig::default()
    }
}

#[test]
fn test_valid_claim_scores_refills_and_ends_the_game() {
    // 15 items: 12 placed, 3 spare for the refill after the claim.
    let rules = Arc::new(ScriptedRules::undecided());
    let handle = GameEngine::new(scripted_config(1, 15))
        .with_display(Arc::new(NullDisplay))
        .with_rules(rules.clone())
        .without_generators()
        .start()
        .unwrap();
    let board = handle.board();

    wait_until("board fill", || board.item_count() == 12);
    thread::sleep(Duration::from_millis(100));

    // Whatever landed on cells 0..3 becomes the one valid combination.
    let triple: Vec<ItemId> = (0..3)
        .map(|i| board.item_at(CellId(i)).expect("cell filled"))
        .collect();
    rules.register(triple);

    let input = handle.input(WorkerId(0));
    for i in 0..3 {
        input.send(CellId(i)).unwrap();
    }

    // Claim settles, the three cells refill from the spare items, the
    // pool is then empty and no claim is left: the game ends on its own.
    let summary = handle.wait();
    assert_eq!(summary.scores, vec![1]);
    assert_eq!(summary.high_score, 1);
    assert_eq!(summary.winners, vec![WorkerId(0)]);
    assert_eq!(summary.rounds, 1);
}

#[test]
fn test_invalid_claim_penalizes_without_touching_items() {
    let display = Arc::new(RecordingDisplay::default());
    let handle = GameEngine::new(scripted_config(1, 12))
        .with_display(display.clone())
        .with_rules(Arc::new(ScriptedRules::undecided()))
        .without_generators()
        .start()
        .unwrap();
    let board = handle.board();

    wait_until("board fill", || board.item_count() == 12);
    thread::sleep(Duration::from_millis(100));

    // No combination is ever registered, so whatever the worker marks
    // comes back invalid while the position still reads as alive.
    let input = handle.input(WorkerId(0));
    for i in 0..3 {
        input.send(CellId(i)).unwrap();
    }

    // Invalid verdict: markers cleared, penalty freeze starts.
    wait_until("penalty freeze", || {
        display
            .freezes
            .lock()
            .unwrap()
            .iter()
            .any(|(worker, remaining)| *worker == WorkerId(0) && !remaining.is_zero())
    });
    assert_eq!(board.marked_count(WorkerId(0)), 0);
    assert_eq!(board.item_count(), 12);
    assert!(display.scores.lock().unwrap().is_empty());

    handle.stop();
    let summary = handle.wait();
    assert_eq!(summary.scores, vec![0]);
    assert_eq!(summary.high_score, 0);
}

#[test]
fn test_turn_expiry_plays_rounds_then_ties_all_workers() {
    /// Alive for a fixed number of game-end checks, then dead; no claim
    /// is ever valid, so no one can score.
    struct RoundBudget {
        checks: Mutex<usize>,
    }

    impl ClaimRules for RoundBudget {
        fn is_valid_claim(&self, _items: &[ItemId]) -> bool {
            false
        }
        fn count_claims(&self, _items: &[ItemId], limit: usize) -> usize {
            let mut left = self.checks.lock().unwrap();
            if *left == 0 {
                0
            } else {
                *left -= 1;
                1.min(limit)
            }
        }
    }

    let config = GameConfig {
        workers: 2,
        turn_millis: 150,
        warning_millis: 50,
        seed: Some(5),
        ..GameConfig::default()
    };
    let start = Instant::now();
    let summary = GameEngine::new(config)
        .with_display(Arc::new(NullDisplay))
        .with_rules(Arc::new(RoundBudget {
            checks: Mutex::new(2),
        }))
        .without_generators()
        .run()
        .unwrap();

    // Two full turns had to expire before the position read as dead.
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.high_score, 0);
    assert_eq!(summary.winners, vec![WorkerId(0), WorkerId(1)]);
}

#[test]
fn test_synthetic_workers_play_and_shut_down() {
    // Real generators, real feature rules, short turns; stopped from
    // outside. Exercises the full thread set either way the race goes.
    let config = GameConfig {
        workers: 3,
        turn_millis: 300,
        warning_millis: 50,
        reward_freeze_millis: 10,
        penalty_freeze_millis: 10,
        input_interval_millis: 1,
        seed: Some(9),
        ..GameConfig::default()
    };
    let handle = GameEngine::new(config)
        .with_display(Arc::new(NullDisplay))
        .start()
        .unwrap();
    thread::sleep(Duration::from_millis(400));
    handle.stop();
    let summary = handle.wait();
    assert_eq!(summary.scores.len(), 3);
    // Winner set is never empty and only contains real ids.
    assert!(!summary.winners.is_empty());
    assert!(summary.winners.iter().all(|w| w.0 < 3));
}
