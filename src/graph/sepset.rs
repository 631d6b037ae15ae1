//! The separating-set registry filled during skeleton discovery.

use super::node::{CondSet, VarId, VarPair};
use std::collections::BTreeMap;

/// Everything known about why a pair was separated.
#[derive(Debug, Clone, PartialEq)]
pub struct SepsetRecord {
    /// Conditioning sets that rendered the pair independent, in the order found.
    pub sets: Vec<CondSet>,
    /// The p-value of the most recent separating test.
    pub p_value: f64,
}

/// Maps an unordered pair to its separating sets. Lists are append-only.
#[derive(Debug, Clone, Default)]
pub struct SepsetRegistry {
    records: BTreeMap<VarPair, SepsetRecord>,
}

impl SepsetRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn record(&mut self, pair: VarPair, set: CondSet, p_value: f64) {
        let entry = self
            .records
            .entry(pair)
            .or_insert_with(|| SepsetRecord { sets: Vec::new(), p_value });
        entry.sets.push(set);
        entry.p_value = p_value;
    }

    pub fn get(&self, pair: VarPair) -> Option<&SepsetRecord> { self.records.get(&pair) }

    pub fn sets(&self, pair: VarPair) -> &[CondSet] {
        self.records.get(&pair).map(|r| r.sets.as_slice()).unwrap_or(&[])
    }

    pub fn p_value(&self, pair: VarPair) -> Option<f64> {
        self.records.get(&pair).map(|r| r.p_value)
    }

    /// Whether `z` appears in any separating set recorded for `pair`.
    pub fn separates_via(&self, pair: VarPair, z: VarId) -> bool {
        self.sets(pair).iter().any(|s| s.contains(&z))
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&VarPair, &SepsetRecord)> {
        self.records.iter()
    }
}
