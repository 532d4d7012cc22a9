use model::{core::identifiers::RowId, records::row::ImportRow};
use std::collections::HashSet;

/// Returns the row ids to discard so that exactly one row per key survives.
///
/// The first row seen for a key is kept, every later one is returned, in input order.
/// Which row counts as "first" is entirely up to the caller's ordering; sort newest
/// first to keep the most recent row.
pub fn resolve_duplicates(rows: &[ImportRow]) -> Vec<RowId> {
    let mut seen: HashSet<&str> = HashSet::new();

    rows.iter()
        .filter(|r| !seen.insert(r.key.as_str()))
        .map(|r| r.row)
        .collect()
}
