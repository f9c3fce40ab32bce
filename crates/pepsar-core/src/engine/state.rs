use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-position chosen monomers: position-name → list of monomer strings.
///
/// An empty list means "no constraint at this position" and is kept in the
/// map so persisted state round-trips exactly. Two independent instances
/// exist per session, one driving selection and one driving filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionSelection {
    positions: BTreeMap<String, Vec<String>>,
}

impl PositionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the monomer to the position's list, or removes it if present.
    pub fn toggle(&mut self, position: &str, monomer: &str) {
        let list = self.positions.entry(position.to_string()).or_default();
        match list.iter().position(|m| m == monomer) {
            Some(index) => {
                list.remove(index);
            }
            None => list.push(monomer.to_string()),
        }
    }

    pub fn is_selected(&self, position: &str, monomer: &str) -> bool {
        self.positions
            .get(position)
            .is_some_and(|list| list.iter().any(|m| m == monomer))
    }

    /// Chosen monomers at a position; empty when unconstrained.
    pub fn monomers_at(&self, position: &str) -> &[String] {
        self.positions
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Positions with at least one chosen monomer.
    pub fn constrained_positions(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.positions
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(position, list)| (position.as_str(), list.as_slice()))
    }

    /// True when no position carries a constraint.
    pub fn is_empty(&self) -> bool {
        self.positions.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Currently chosen cluster names, drawn from either partition and
/// discriminated by membership lookup rather than a type tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterSelection {
    clusters: Vec<String>,
}

impl ClusterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, name: &str) {
        match self.clusters.iter().position(|c| c == name) {
            Some(index) => {
                self.clusters.remove(index);
            }
            None => self.clusters.push(name.to_string()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clusters.iter().any(|c| c == name)
    }

    pub fn names(&self) -> &[String] {
        &self.clusters
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn clear(&mut self) {
        self.clusters.clear();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
