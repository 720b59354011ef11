//! The shared board: a fixed grid of cells holding items and per-worker
//! markers.
//!
//! One mutex covers the whole grid. Refill (supervisor) and marking
//! (workers) touch the same cells concurrently, so placement and marker
//! mutation are serialized in a single mutual-exclusion domain and never
//! interleave partially.
//!
//! Markers are stored centrally here, in two views kept consistent under
//! the one lock: a per-cell worker set and a per-worker insertion-ordered
//! cell list. The supervisor can therefore clear a worker's whole marker
//! set atomically without reaching into worker-thread state.
//!
//! Invariants:
//! - a marker on a cell implies the cell holds an item
//! - a cell holds at most one item
//! - a worker holds at most `capacity` markers

use std::sync::Mutex;

use crate::types::{CellId, ItemId, WorkerId};

/// Result of a marker mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Marker placed; payload is the worker's marker count afterwards.
    Marked(usize),
    /// Marker removed.
    Unmarked,
    /// Empty cell, out-of-range cell, duplicate/absent marker, or worker
    /// at capacity. Invalid input is ignored, never fatal.
    Rejected,
}

#[derive(Debug, Default)]
struct Cell {
    item: Option<ItemId>,
    markers: Vec<WorkerId>,
}

#[derive(Debug)]
struct State {
    cells: Vec<Cell>,
    /// Per-worker marked cells, insertion order preserved.
    marked: Vec<Vec<CellId>>,
}

impl State {
    fn unmark(&mut self, worker: WorkerId, cell: CellId) -> MarkOutcome {
        let Some(pos) = self.marked[worker.0].iter().position(|c| *c == cell) else {
            return MarkOutcome::Rejected;
        };
        self.marked[worker.0].remove(pos);
        self.cells[cell.0].markers.retain(|w| *w != worker);
        MarkOutcome::Unmarked
    }

    fn mark(&mut self, worker: WorkerId, cell: CellId, capacity: usize) -> MarkOutcome {
        if self.cells[cell.0].item.is_none() {
            return MarkOutcome::Rejected;
        }
        if self.marked[worker.0].contains(&cell) || self.marked[worker.0].len() >= capacity {
            return MarkOutcome::Rejected;
        }
        self.marked[worker.0].push(cell);
        self.cells[cell.0].markers.push(worker);
        MarkOutcome::Marked(self.marked[worker.0].len())
    }

    /// Clear the item and every worker's marker on one cell.
    fn remove_item(&mut self, cell: CellId) -> Option<ItemId> {
        for worker in std::mem::take(&mut self.cells[cell.0].markers) {
            self.marked[worker.0].retain(|c| *c != cell);
        }
        self.cells[cell.0].item.take()
    }
}

/// The shared mutable grid. Cloned around as `Arc<Board>`.
#[derive(Debug)]
pub struct Board {
    inner: Mutex<State>,
}

impl Board {
    pub fn new(cells: usize, workers: usize) -> Self {
        let mut grid = Vec::with_capacity(cells);
        grid.resize_with(cells, Cell::default);
        Self {
            inner: Mutex::new(State {
                cells: grid,
                marked: vec![Vec::new(); workers],
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned board means a panicking thread died mid-mutation;
        // propagate the panic rather than limp on with torn state.
        self.inner.lock().expect("board mutex poisoned")
    }

    pub fn cell_count(&self) -> usize {
        self.lock().cells.len()
    }

    /// Place an item on an empty cell. Returns false if the cell is out
    /// of range or already occupied.
    pub fn place_item(&self, cell: CellId, item: ItemId) -> bool {
        let mut state = self.lock();
        match state.cells.get_mut(cell.0) {
            Some(c) if c.item.is_none() => {
                c.item = Some(item);
                true
            }
            _ => false,
        }
    }

    /// Clear the item and all markers (from every worker) on one cell.
    pub fn remove_item(&self, cell: CellId) -> Option<ItemId> {
        let mut state = self.lock();
        if cell.0 >= state.cells.len() {
            return None;
        }
        state.remove_item(cell)
    }

    /// Place one worker's marker. Rejected when the cell is empty or out
    /// of range, already marked by this worker, or the worker is at
    /// capacity.
    pub fn mark(&self, worker: WorkerId, cell: CellId, capacity: usize) -> MarkOutcome {
        let mut state = self.lock();
        if cell.0 >= state.cells.len() {
            return MarkOutcome::Rejected;
        }
        state.mark(worker, cell, capacity)
    }

    /// Remove one worker's marker. Rejected (no-op) when the worker has
    /// no marker there.
    pub fn unmark(&self, worker: WorkerId, cell: CellId) -> MarkOutcome {
        let mut state = self.lock();
        if cell.0 >= state.cells.len() {
            return MarkOutcome::Rejected;
        }
        state.unmark(worker, cell)
    }

    /// Unmark if marked, mark otherwise; one atomic decision under the
    /// lock so a worker's own toggle can never race its snapshot.
    pub fn toggle_mark(&self, worker: WorkerId, cell: CellId, capacity: usize) -> MarkOutcome {
        let mut state = self.lock();
        if cell.0 >= state.cells.len() {
            return MarkOutcome::Rejected;
        }
        if state.marked[worker.0].contains(&cell) {
            state.unmark(worker, cell)
        } else {
            state.mark(worker, cell, capacity)
        }
    }

    /// One worker's marked cells, in the order they were placed.
    pub fn snapshot_marked(&self, worker: WorkerId) -> Vec<CellId> {
        self.lock().marked[worker.0].clone()
    }

    pub fn marked_count(&self, worker: WorkerId) -> usize {
        self.lock().marked[worker.0].len()
    }

    /// Verification-time view of one worker's claim: the marked cells
    /// with their *current* contents, read in one critical section. A
    /// `None` item means the cell changed since it was marked and the
    /// claim is stale.
    pub fn claim_view(&self, worker: WorkerId) -> Vec<(CellId, Option<ItemId>)> {
        let state = self.lock();
        state.marked[worker.0]
            .iter()
            .map(|cell| (*cell, state.cells[cell.0].item))
            .collect()
    }

    /// Drop every marker one worker holds, board-wide.
    pub fn clear_markers(&self, worker: WorkerId) {
        let mut state = self.lock();
        for cell in std::mem::take(&mut state.marked[worker.0]) {
            state.cells[cell.0].markers.retain(|w| *w != worker);
        }
    }

    /// Atomically settle a validated claim: on each named cell, clear
    /// every worker's markers, remove the item, and place a replacement
    /// while `refills` lasts. Returns the removed items.
    pub fn settle_cells(&self, cells: &[CellId], refills: Vec<ItemId>) -> Vec<ItemId> {
        let mut state = self.lock();
        let mut refills = refills.into_iter();
        let mut removed = Vec::with_capacity(cells.len());
        for cell in cells {
            if let Some(item) = state.remove_item(*cell) {
                removed.push(item);
            }
            if let Some(replacement) = refills.next() {
                state.cells[cell.0].item = Some(replacement);
            }
        }
        removed
    }

    /// Round-end reset: remove every item and every marker, returning
    /// the items so the supervisor can put them back in the pool.
    pub fn sweep(&self) -> Vec<ItemId> {
        let mut state = self.lock();
        for list in &mut state.marked {
            list.clear();
        }
        state
            .cells
            .iter_mut()
            .filter_map(|cell| {
                cell.markers.clear();
                cell.item.take()
            })
            .collect()
    }

    pub fn item_at(&self, cell: CellId) -> Option<ItemId> {
        let state = self.lock();
        state.cells.get(cell.0).and_then(|c| c.item)
    }

    /// Every item currently placed, in cell order.
    pub fn items(&self) -> Vec<ItemId> {
        self.lock().cells.iter().filter_map(|c| c.item).collect()
    }

    pub fn item_count(&self) -> usize {
        self.lock().cells.iter().filter(|c| c.item.is_some()).count()
    }

    /// Cells with no item, in grid order.
    pub fn empty_cells(&self) -> Vec<CellId> {
        self.lock()
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.item.is_none())
            .map(|(i, _)| CellId(i))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
