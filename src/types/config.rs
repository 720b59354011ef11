//! Game configuration.
//!
//! Loaded from a JSON file, overridable from the CLI; every field has a
//! default so an empty `{}` file is a playable game.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::types::ConfigError;
use crate::{
    DEFAULT_CLAIM_CAPACITY, DEFAULT_FEATURE_COUNT, DEFAULT_FEATURE_VALUES, DEFAULT_GRID_CELLS,
    DEFAULT_INPUT_INTERVAL_MILLIS, DEFAULT_PENALTY_FREEZE_MILLIS, DEFAULT_REWARD_FREEZE_MILLIS,
    DEFAULT_TURN_MILLIS, DEFAULT_WARNING_MILLIS,
};

/// Everything tunable about one game.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of worker (player) threads.
    pub workers: usize,
    /// Markers needed to submit a claim.
    pub claim_capacity: usize,
    /// Cells on the board grid.
    pub grid_cells: usize,
    /// Distinct feature positions per item.
    pub feature_count: u32,
    /// Values each feature can take; deck size = values^features.
    pub feature_values: u32,
    /// Turn length in milliseconds.
    pub turn_millis: u64,
    /// Countdown warning window in milliseconds.
    pub warning_millis: u64,
    /// Freeze after a valid claim, milliseconds.
    pub reward_freeze_millis: u64,
    /// Freeze after an invalid claim, milliseconds.
    pub penalty_freeze_millis: u64,
    /// Pause between synthetic input events, milliseconds.
    pub input_interval_millis: u64,
    /// Total distinct items in the pool; defaults to the full feature
    /// deck (values^features) when absent.
    pub pool_items: Option<usize>,
    /// Fixed RNG seed for shuffles and synthetic input; random when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            claim_capacity: DEFAULT_CLAIM_CAPACITY,
            grid_cells: DEFAULT_GRID_CELLS,
            feature_count: DEFAULT_FEATURE_COUNT,
            feature_values: DEFAULT_FEATURE_VALUES,
            turn_millis: DEFAULT_TURN_MILLIS,
            warning_millis: DEFAULT_WARNING_MILLIS,
            reward_freeze_millis: DEFAULT_REWARD_FREEZE_MILLIS,
            penalty_freeze_millis: DEFAULT_PENALTY_FREEZE_MILLIS,
            input_interval_millis: DEFAULT_INPUT_INTERVAL_MILLIS,
            pool_items: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Total distinct items in the pool.
    pub fn deck_size(&self) -> usize {
        self.pool_items
            .unwrap_or_else(|| (self.feature_values as usize).pow(self.feature_count))
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_millis(self.turn_millis)
    }

    pub fn warning_duration(&self) -> Duration {
        Duration::from_millis(self.warning_millis)
    }

    pub fn reward_freeze(&self) -> Duration {
        Duration::from_millis(self.reward_freeze_millis)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    pub fn input_interval(&self) -> Duration {
        Duration::from_millis(self.input_interval_millis)
    }

    /// Reject shapes the game cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.claim_capacity == 0 {
            return Err(ConfigError::Invalid("claim_capacity must be at least 1".into()));
        }
        if self.grid_cells < self.claim_capacity {
            return Err(ConfigError::Invalid(format!(
                "grid_cells ({}) must be at least claim_capacity ({})",
                self.grid_cells, self.claim_capacity
            )));
        }
        if self.feature_count == 0 || self.feature_values == 0 {
            return Err(ConfigError::Invalid(
                "feature_count and feature_values must be at least 1".into(),
            ));
        }
        if self.deck_size() < self.claim_capacity {
            return Err(ConfigError::Invalid(format!(
                "deck of {} items cannot hold a claim of {}",
                self.deck_size(),
                self.claim_capacity
            )));
        }
        if self.warning_millis > self.turn_millis {
            return Err(ConfigError::Invalid(
                "warning_millis cannot exceed turn_millis".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
