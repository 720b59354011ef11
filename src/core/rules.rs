//! Claim verification rules.
//!
//! The supervisor treats the rules as an opaque predicate: it never
//! inspects item structure itself. `FeatureRules` is the stock
//! implementation over a feature deck, used both to verify a single
//! claim and to detect dead positions (no valid claim left anywhere in
//! pool + board) for round/game end.

use crate::types::ItemId;

/// Pure, side-effect-free verification used by the supervisor.
pub trait ClaimRules: Send + Sync {
    /// Does this exact set of items form a valid claim?
    fn is_valid_claim(&self, items: &[ItemId]) -> bool;

    /// Count valid claims hidden in `items`, stopping early at `limit`.
    fn count_claims(&self, items: &[ItemId], limit: usize) -> usize;

    /// Is at least one valid claim present?
    fn has_claim(&self, items: &[ItemId]) -> bool {
        self.count_claims(items, 1) > 0
    }
}

/// Feature-deck rules: an item id encodes `features` digits in base
/// `values`; a claim is valid iff every feature position is all-equal or
/// all-distinct across the claimed items.
#[derive(Debug, Clone)]
pub struct FeatureRules {
    features: u32,
    values: u32,
    capacity: usize,
}

impl FeatureRules {
    pub fn new(features: u32, values: u32, capacity: usize) -> Self {
        Self {
            features,
            values,
            capacity,
        }
    }

    /// The full deck this rule set plays over: one item per feature
    /// combination.
    pub fn deck(&self) -> Vec<ItemId> {
        (0..self.values.pow(self.features)).map(ItemId).collect()
    }

    fn feature_of(&self, item: ItemId, position: u32) -> u32 {
        (item.0 / self.values.pow(position)) % self.values
    }

    fn count_from(&self, items: &[ItemId], chosen: &mut Vec<ItemId>, limit: usize) -> usize {
        if chosen.len() == self.capacity {
            return usize::from(self.is_valid_claim(chosen));
        }
        let mut found = 0;
        let needed = self.capacity - chosen.len();
        for (i, item) in items.iter().enumerate() {
            if items.len() - i < needed {
                break;
            }
            chosen.push(*item);
            found += self.count_from(&items[i + 1..], chosen, limit - found);
            chosen.pop();
            if found >= limit {
                break;
            }
        }
        found
    }
}

impl ClaimRules for FeatureRules {
    fn is_valid_claim(&self, items: &[ItemId]) -> bool {
        if items.len() != self.capacity {
            return false;
        }
        for position in 0..self.features {
            let mut digits: Vec<u32> = items
                .iter()
                .map(|item| self.feature_of(*item, position))
                .collect();
            let all_equal = digits.iter().all(|d| *d == digits[0]);
            digits.sort_unstable();
            digits.dedup();
            let all_distinct = digits.len() == items.len();
            if !all_equal && !all_distinct {
                return false;
            }
        }
        true
    }

    fn count_claims(&self, items: &[ItemId], limit: usize) -> usize {
        if limit == 0 || items.len() < self.capacity {
            return 0;
        }
        self.count_from(items, &mut Vec::with_capacity(self.capacity), limit)
    }
}

// =============================================================================
// TESTS
// =============================================================================
