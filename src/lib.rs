//! Triplet: a concurrent claim-matching table game.
//!
//! One supervisor thread owns the turn clock, refills the board from the
//! item pool, and is the sole authority that verifies claims. N worker
//! threads mark cells in response to input events; a full marker set is
//! handed to the supervisor over a FIFO claim channel, and the verdict
//! comes back on that worker's own signal channel.

pub mod core;
pub mod types;

// =============================================================================
// DEFAULT TUNING - overridable through GameConfig
// =============================================================================

/// Markers a worker must place to submit a claim.
pub const DEFAULT_CLAIM_CAPACITY: usize = 3;

/// Number of cells on the board grid.
pub const DEFAULT_GRID_CELLS: usize = 12;

/// Turn length before the board is reshuffled (milliseconds).
pub const DEFAULT_TURN_MILLIS: u64 = 60_000;

/// Countdown warning window at the end of a turn (milliseconds).
pub const DEFAULT_WARNING_MILLIS: u64 = 5_000;

/// Freeze after a valid claim (milliseconds).
pub const DEFAULT_REWARD_FREEZE_MILLIS: u64 = 1_000;

/// Freeze after an invalid claim (milliseconds).
pub const DEFAULT_PENALTY_FREEZE_MILLIS: u64 = 3_000;

/// Pause between synthetic input events (milliseconds).
pub const DEFAULT_INPUT_INTERVAL_MILLIS: u64 = 50;

/// Item features and values per feature; the default deck holds
/// `values^features` distinct items.
pub const DEFAULT_FEATURE_COUNT: u32 = 4;
pub const DEFAULT_FEATURE_VALUES: u32 = 3;

// =============================================================================
// SUPERVISOR / DISPLAY CADENCE
// =============================================================================

/// Claim-channel poll while the turn clock is far from the deadline.
pub const COARSE_POLL_MILLIS: u64 = 1_000;

/// Claim-channel poll inside the warning window; keeps the countdown
/// display accurate to ~10ms.
pub const FINE_POLL_MILLIS: u64 = 10;

/// Refresh cadence for the freeze countdown display.
pub const DISPLAY_TICK_MILLIS: u64 = 500;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
