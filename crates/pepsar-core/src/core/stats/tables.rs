use super::summary::{Stats, StatsSummary};
use std::collections::{BTreeMap, HashMap};

/// Per-position statistics: one [`Stats`] per monomer occurring at the
/// position, plus the running min/max summary over those entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionStats {
    pub monomers: HashMap<String, Stats>,
    pub general: StatsSummary,
}

/// The monomer-position statistics table: position-name → per-position stats,
/// plus a table-wide summary folded from the per-position summaries.
///
/// Every (position, monomer) pair occurring at least once in the data has an
/// entry; the summaries are only ever updated through folds, so they stay
/// consistent with the union of their entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonomerPositionStats {
    pub positions: HashMap<String, PositionStats>,
    pub general: StatsSummary,
}

impl MonomerPositionStats {
    pub fn get(&self, position: &str, monomer: &str) -> Option<&Stats> {
        self.positions
            .get(position)
            .and_then(|p| p.monomers.get(monomer))
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Total number of (position, monomer) entries.
    pub fn entry_count(&self) -> usize {
        self.positions.values().map(|p| p.monomers.len()).sum()
    }
}

/// Cluster statistics split by provenance: `original` clusters come from a
/// categorical column of the source data, `custom` clusters are user-drawn
/// boolean columns. Name resolution is original-first; uniqueness across the
/// two partitions is enforced where custom clusters are created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterTypeStats {
    pub original: HashMap<String, Stats>,
    pub custom: HashMap<String, Stats>,
}

impl ClusterTypeStats {
    pub fn get(&self, name: &str) -> Option<&Stats> {
        self.original.get(name).or_else(|| self.custom.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty() && self.custom.is_empty()
    }
}

/// Partner rows of one (monomer, position) cell, keyed by reference row.
pub type CliffNeighbors = BTreeMap<usize, Vec<usize>>;

/// The mutation-cliff structure: monomer → position → reference row → rows
/// reachable from the reference by mutating at that position.
///
/// Each qualifying pair (i, j) appears twice, once under each row's own
/// monomer at the differing position keyed by that row; consumers wanting
/// undirected pairs union both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationCliffs {
    pub(crate) monomers: HashMap<String, HashMap<String, CliffNeighbors>>,
}

impl MutationCliffs {
    pub fn record(&mut self, monomer: &str, position: &str, reference: usize, other: usize) {
        self.monomers
            .entry(monomer.to_string())
            .or_default()
            .entry(position.to_string())
            .or_default()
            .entry(reference)
            .or_default()
            .push(other);
    }

    pub fn get(&self, monomer: &str) -> Option<&HashMap<String, CliffNeighbors>> {
        self.monomers.get(monomer)
    }

    pub fn neighbors(&self, monomer: &str, position: &str, reference: usize) -> Option<&[usize]> {
        self.monomers
            .get(monomer)
            .and_then(|positions| positions.get(position))
            .and_then(|refs| refs.get(&reference))
            .map(Vec::as_slice)
    }

    pub fn monomers(&self) -> impl Iterator<Item = &str> {
        self.monomers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.monomers.is_empty()
    }

    /// Total number of recorded (monomer, position, reference, other) tuples.
    pub fn pair_count(&self) -> usize {
        self.monomers
            .values()
            .flat_map(|positions| positions.values())
            .flat_map(|refs| refs.values())
            .map(Vec::len)
            .sum()
    }

    /// All recorded tuples as (monomer, position, reference, other), ordered
    /// deterministically for export.
    pub fn flat_pairs(&self) -> Vec<(&str, &str, usize, usize)> {
        let mut pairs = Vec::with_capacity(self.pair_count());
        for (monomer, positions) in &self.monomers {
            for (position, refs) in positions {
                for (&reference, others) in refs {
                    for &other in others {
                        pairs.push((monomer.as_str(), position.as_str(), reference, other));
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}
