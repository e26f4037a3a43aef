//! Dependency graph between cell names.
//!
//! # Edge Direction
//!
//! ```text
//! A → B  means  "B's formula references A"  (A is a dependee of B)
//! ```
//!
//! Both directions are stored so that "who reads A?" and "what does B read?"
//! are single map lookups.

use std::collections::{BTreeMap, BTreeSet};

/// Bidirectional adjacency over cell names.
///
/// # Invariants
///
/// 1. If A ∈ dependees[B] then B ∈ dependents[A], and vice versa.
/// 2. Empty sets are removed, not stored.
/// 3. Set semantics: an ordered pair is stored at most once.
///
/// Sorted containers keep enumeration order deterministic.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    /// A -> {B, ...}: cells whose formulas reference A.
    dependents: BTreeMap<String, BTreeSet<String>>,
    /// B -> {A, ...}: cells that B's formula references.
    dependees: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ordered pairs in the graph.
    pub fn len(&self) -> usize {
        self.dependees.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.dependees.is_empty()
    }

    /// Number of cells `name` references.
    pub fn dependee_count(&self, name: &str) -> usize {
        self.dependees.get(name).map_or(0, BTreeSet::len)
    }

    pub fn has_dependents(&self, name: &str) -> bool {
        self.dependents.contains_key(name)
    }

    pub fn has_dependees(&self, name: &str) -> bool {
        self.dependees.contains_key(name)
    }

    /// Cells whose formulas directly reference `name`.
    pub fn dependents(&self, name: &str) -> impl Iterator<Item = &str> + '_ {
        self.dependents
            .get(name)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Cells directly referenced by `name`'s formula.
    pub fn dependees(&self, name: &str) -> impl Iterator<Item = &str> + '_ {
        self.dependees
            .get(name)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    pub fn contains(&self, dependee: &str, dependent: &str) -> bool {
        self.dependents
            .get(dependee)
            .is_some_and(|s| s.contains(dependent))
    }

    /// Add the edge `dependee → dependent`. No-op if present.
    pub fn add_dependency(&mut self, dependee: &str, dependent: &str) {
        self.dependents
            .entry(dependee.to_string())
            .or_default()
            .insert(dependent.to_string());
        self.dependees
            .entry(dependent.to_string())
            .or_default()
            .insert(dependee.to_string());
    }

    /// Remove the edge `dependee → dependent`. No-op if absent.
    pub fn remove_dependency(&mut self, dependee: &str, dependent: &str) {
        remove_from(&mut self.dependents, dependee, dependent);
        remove_from(&mut self.dependees, dependent, dependee);
    }

    /// Replace every edge into `dependent` with one edge from each of
    /// `new_dependees`. Pass an empty iterator to clear them.
    pub fn replace_dependees<I, S>(&mut self, dependent: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(old) = self.dependees.remove(dependent) {
            for dependee in old {
                remove_from(&mut self.dependents, &dependee, dependent);
            }
        }
        for dependee in new_dependees {
            self.add_dependency(dependee.as_ref(), dependent);
        }
    }

    /// Replace every edge out of `dependee` with one edge to each of
    /// `new_dependents`.
    pub fn replace_dependents<I, S>(&mut self, dependee: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(old) = self.dependents.remove(dependee) {
            for dependent in old {
                remove_from(&mut self.dependees, &dependent, dependee);
            }
        }
        for dependent in new_dependents {
            self.add_dependency(dependee, dependent.as_ref());
        }
    }
}

fn remove_from(map: &mut BTreeMap<String, BTreeSet<String>>, key: &str, member: &str) {
    if let Some(set) = map.get_mut(key) {
        set.remove(member);
        if set.is_empty() {
            map.remove(key);
        }
    }
}
