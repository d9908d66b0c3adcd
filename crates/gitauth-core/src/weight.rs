//! Item weights.
//!
//! The scheduler never computes weights itself; it asks a
//! [`WeightProvider`] injected for the run. Weights for commits come from
//! `git show --numstat` line counts, gathered up front by the caller and
//! parsed here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight substituted for unknown items under [`MissingWeightPolicy::MinimumPositive`].
pub const MINIMUM_WEIGHT: f64 = 1.0;

/// Supplies a non-negative weight per item identifier.
pub trait WeightProvider {
    /// Weight of `item_id`, or `None` when it is unknown.
    fn weight_of(&self, item_id: &str) -> Option<f64>;
}

impl<F> WeightProvider for F
where
    F: Fn(&str) -> Option<f64>,
{
    fn weight_of(&self, item_id: &str) -> Option<f64> {
        self(item_id)
    }
}

/// What to do when the provider has no weight for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingWeightPolicy {
    /// Fail the run with `MissingWeight`.
    Error,
    /// Treat the item as weighing [`MINIMUM_WEIGHT`].
    #[default]
    MinimumPositive,
}

/// Precomputed weights keyed by item identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticWeights {
    weights: HashMap<String, f64>,
}

impl StaticWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item_id: impl Into<String>, weight: f64) {
        self.weights.insert(item_id.into(), weight);
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl WeightProvider for StaticWeights {
    fn weight_of(&self, item_id: &str) -> Option<f64> {
        self.weights.get(item_id).copied()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for StaticWeights {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().map(|(k, w)| (k.into(), w)).collect(),
        }
    }
}

/// Every item weighs the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeights;

impl WeightProvider for UniformWeights {
    fn weight_of(&self, _item_id: &str) -> Option<f64> {
        Some(MINIMUM_WEIGHT)
    }
}

/// Sum of added and deleted lines in `git show --numstat --format=` output.
///
/// Binary files report `-` in both columns and count as zero. Lines that
/// do not start with two count columns are ignored.
pub fn parse_numstat(output: &str) -> u64 {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let added = parts.next()?;
            let deleted = parts.next()?;
            let count = |col: &str| -> Option<u64> {
                if col == "-" {
                    Some(0)
                } else {
                    col.parse().ok()
                }
            };
            Some(count(added)? + count(deleted)?)
        })
        .sum()
}

/// Weight of a commit from its numstat output, never below [`MINIMUM_WEIGHT`].
pub fn commit_weight(numstat_output: &str) -> f64 {
    (parse_numstat(numstat_output) as f64).max(MINIMUM_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numstat_sums_columns() {
        let output = "10\t2\tsrc/main.rs\n3\t0\tREADME.md\n";
        assert_eq!(parse_numstat(output), 15);
    }

    #[test]
    fn test_parse_numstat_binary_and_garbage() {
        let output = "-\t-\tassets/logo.png\n4\t1\tlib.rs\nnot a stat line\n\n";
        assert_eq!(parse_numstat(output), 5);
    }

    #[test]
    fn test_commit_weight_has_floor() {
        assert_eq!(commit_weight(""), MINIMUM_WEIGHT);
        assert_eq!(commit_weight("-\t-\tbin.dat"), MINIMUM_WEIGHT);
        assert_eq!(commit_weight("7\t5\tx.rs"), 12.0);
    }

    #[test]
    fn test_static_weights() {
        let weights: StaticWeights = [("a", 2.0), ("b", 0.5)].into_iter().collect();
        assert_eq!(weights.weight_of("a"), Some(2.0));
        assert_eq!(weights.weight_of("missing"), None);
        assert_eq!(weights.len(), 2);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |id: &str| if id.starts_with('x') { Some(3.0) } else { None };
        assert_eq!(provider.weight_of("xyz"), Some(3.0));
        assert_eq!(provider.weight_of("abc"), None);
    }

    #[test]
    fn test_policy_serde() {
        let policy: MissingWeightPolicy = serde_json::from_str("\"minimum_positive\"").unwrap();
        assert_eq!(policy, MissingWeightPolicy::MinimumPositive);
        assert_eq!(serde_json::to_string(&MissingWeightPolicy::Error).unwrap(), "\"error\"");
    }
}
