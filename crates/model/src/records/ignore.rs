use crate::core::identifiers::RowId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Row identifiers the per-row transform must skip for one run.
///
/// Identifiers are unique and keep the order in which they were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RowId>", into = "Vec<RowId>")]
pub struct IgnoreSet {
    ordered: Vec<RowId>,
    lookup: HashSet<RowId>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `row`; returns false if it was already present.
    pub fn insert(&mut self, row: RowId) -> bool {
        if !self.lookup.insert(row) {
            return false;
        }
        self.ordered.push(row);
        true
    }

    pub fn contains(&self, row: RowId) -> bool {
        self.lookup.contains(&row)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.ordered.iter().copied()
    }

    pub fn as_slice(&self) -> &[RowId] {
        &self.ordered
    }
}

impl FromIterator<RowId> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        let mut set = IgnoreSet::new();
        for row in iter {
            set.insert(row);
        }
        set
    }
}

impl From<Vec<RowId>> for IgnoreSet {
    fn from(rows: Vec<RowId>) -> Self {
        rows.into_iter().collect()
    }
}

impl From<IgnoreSet> for Vec<RowId> {
    fn from(set: IgnoreSet) -> Self {
        set.ordered
    }
}
