//! Per-key interval accumulation

use std::collections::{BTreeMap, HashMap};

/// Placeholder for the condition key before the first accepted press.
///
/// Deltas recorded against it never reach the summary output.
pub const PRE_START: char = '\0';

/// Running per-key lists of signed millisecond deltas.
///
/// Each delta is the time the key spent as the active condition before the
/// next valid press. Deltas may be negative: a timeout appends a correction
/// that cancels the portion of the final interval past the observation
/// boundary.
#[derive(Debug, Default)]
pub struct IntervalAccumulator {
    deltas: HashMap<char, Vec<i64>>,
}

impl IntervalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta to the key's running list.
    pub fn record(&mut self, key: char, delta_ms: i64) {
        self.deltas.entry(key).or_default().push(delta_ms);
    }

    /// Reduce each key's delta list to its sum, excluding the pre-start
    /// placeholder. Summation is commutative, so the append order never
    /// affects the totals.
    pub fn finalize(&self) -> BTreeMap<char, i64> {
        self.deltas
            .iter()
            .filter(|(key, _)| **key != PRE_START)
            .map(|(key, deltas)| (*key, deltas.iter().sum()))
            .collect()
    }

    /// Number of keys with at least one recorded delta.
    pub fn key_count(&self) -> usize {
        self.deltas.len()
    }
}
