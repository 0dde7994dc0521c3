//! Lifetime trigger counts per gesture label.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gestura_hand_model::gesture::GestureLabel;

/// Label → count. Ordered so reports are stable. Committed two-hand gestures
/// and classified sequences share one key space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureCounters {
    counts: BTreeMap<GestureLabel, u64>,
}

impl GestureCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, label: GestureLabel) -> u64 {
        let count = self.counts.entry(label).or_default();
        *count += 1;
        *count
    }

    pub fn get(&self, label: GestureLabel) -> u64 {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GestureLabel, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    /// Add every count from `other` into `self`.
    pub fn merge(&mut self, other: &GestureCounters) {
        for (label, count) in other.iter() {
            *self.counts.entry(label).or_default() += count;
        }
    }
}
