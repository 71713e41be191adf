//! Round results and the down set derived from them.

use crate::health::CheckResult;
use serde::Serialize;
use std::collections::BTreeSet;

/// Every check result produced by one round, in target order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoundResult {
    results: Vec<CheckResult>,
}

impl RoundResult {
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CheckResult> {
        self.results.iter()
    }

    pub fn up_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_up()).count()
    }

    pub fn down_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_down()).count()
    }

    /// Identifiers of every down target in this round.
    pub fn down_set(&self) -> DownSet {
        self.results
            .iter()
            .filter(|r| r.is_down())
            .map(|r| r.target().to_string())
            .collect()
    }

    /// Down results whose identifier is in `ids`, in target order.
    pub fn down_results_in<'a>(&'a self, ids: &'a DownSet) -> impl Iterator<Item = &'a CheckResult> {
        self.results
            .iter()
            .filter(move |r| r.is_down() && ids.contains(r.target()))
    }

    pub fn into_inner(self) -> Vec<CheckResult> {
        self.results
    }
}

impl<'a> IntoIterator for &'a RoundResult {
    type Item = &'a CheckResult;
    type IntoIter = std::slice::Iter<'a, CheckResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Set of target identifiers classified down.
///
/// Ordered so that iteration, logging and alert bodies are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownSet(BTreeSet<String>);

impl DownSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Identifiers in `self` but not in `other`.
    pub fn difference(&self, other: &DownSet) -> DownSet {
        DownSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn is_disjoint(&self, other: &DownSet) -> bool {
        self.0.is_disjoint(&other.0)
    }
}

impl<S: Into<String>> FromIterator<S> for DownSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        DownSet(iter.into_iter().map(Into::into).collect())
    }
}
