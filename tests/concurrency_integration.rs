//! Cross-thread behavior: overlapping claims racing for the same cells,
//! and marker/item consistency under concurrent board mutation.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use triplet::core::{
    claim_channel, signal_channel, Board, ClaimRules, MarkOutcome, NullDisplay, ShutdownFlag,
    SignalRx, Supervisor, TurnTiming,
};
use triplet::types::{CellId, ItemId, Signal, Verdict, WorkerId};

struct AlwaysValid;

impl ClaimRules for AlwaysValid {
    fn is_valid_claim(&self, items: &[ItemId]) -> bool {
        !items.is_empty()
    }
    fn count_claims(&self, items: &[ItemId], limit: usize) -> usize {
        usize::from(items.len() >= 3).min(limit)
    }
}

/// Skip phase broadcasts, return the next verdict.
fn next_verdict(rx: &SignalRx) -> Verdict {
    loop {
        match rx.recv() {
            Signal::Verdict(verdict) => return verdict,
            Signal::Shutdown => panic!("shutdown before verdict"),
            Signal::Phase(_) => {}
        }
    }
}

// Two claims overlap on one cell. The first settles and removes the
// shared item; the second is then short a marker and must come back
// invalid, even under rules that accept anything.
#[test]
fn test_overlapping_claims_first_wins_second_goes_stale() {
    let board = Arc::new(Board::new(6, 2));
    for i in 0..6 {
        assert!(board.place_item(CellId(i), ItemId(i as u32)));
    }

    let (claim_tx, claim_rx) = claim_channel(2);
    let (tx0, rx0) = signal_channel();
    let (tx1, rx1) = signal_channel();
    let shutdown = ShutdownFlag::new();

    // Both claims are on the channel before the supervisor starts, so
    // settlement order is exactly submission order.
    for i in 0..3 {
        assert!(matches!(
            board.mark(WorkerId(0), CellId(i), 3),
            MarkOutcome::Marked(_)
        ));
    }
    for i in 2..5 {
        assert!(matches!(
            board.mark(WorkerId(1), CellId(i), 3),
            MarkOutcome::Marked(_)
        ));
    }
    assert!(claim_tx.submit(WorkerId(0)));
    assert!(claim_tx.submit(WorkerId(1)));

    let supervisor = Supervisor::new(
        board.clone(),
        Vec::new(),
        claim_rx,
        vec![tx0, tx1],
        Arc::new(NullDisplay),
        Arc::new(AlwaysValid),
        shutdown.clone(),
        3,
        TurnTiming {
            turn: Duration::from_secs(60),
            warning: Duration::from_secs(5),
        },
        Some(7),
    );
    let supervisor = thread::spawn(move || supervisor.run());

    assert_eq!(next_verdict(&rx0), Verdict::Valid);
    assert_eq!(next_verdict(&rx1), Verdict::Invalid);

    // Cells 0..3 settled with no refills available, the loser's leftover
    // markers cleared on the invalid path.
    assert_eq!(board.item_count(), 3);
    assert_eq!(board.marked_count(WorkerId(0)), 0);
    assert_eq!(board.marked_count(WorkerId(1)), 0);

    shutdown.trigger();
    let summary = supervisor.join().unwrap();
    assert_eq!(summary.scores, vec![1, 0]);
    assert_eq!(summary.high_score, 1);
    assert_eq!(summary.winners, vec![WorkerId(0)]);
}

// Hammer the board from marker threads while items churn underneath
// them: no sampled claim view may ever show a marker on an itemless
// cell, and no worker may ever exceed marker capacity.
#[test]
fn test_markers_never_outlive_items_under_churn() {
    const WORKERS: usize = 4;
    const CELLS: usize = 12;
    const CAPACITY: usize = 3;

    let board = Arc::new(Board::new(CELLS, WORKERS));
    for i in 0..CELLS {
        assert!(board.place_item(CellId(i), ItemId(i as u32)));
    }

    let markers: Vec<_> = (0..WORKERS)
        .map(|id| {
            let board = board.clone();
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(id as u64);
                for _ in 0..500 {
                    let cell = CellId(rng.gen_range(0..CELLS));
                    board.toggle_mark(WorkerId(id), cell, CAPACITY);
                }
            })
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let cell = CellId(rng.gen_range(0..CELLS));
        if let Some(item) = board.remove_item(cell) {
            assert!(board.place_item(cell, item));
        }
        for id in 0..WORKERS {
            let view = board.claim_view(WorkerId(id));
            assert!(view.len() <= CAPACITY);
            assert!(
                view.iter().all(|(_, item)| item.is_some()),
                "marker on an itemless cell: {:?}",
                view
            );
        }
    }

    for handle in markers {
        handle.join().unwrap();
    }
    // Item identity survived the churn.
    let mut items = board.items();
    items.sort();
    assert_eq!(items, (0..CELLS as u32).map(ItemId).collect::<Vec<_>>());
}
