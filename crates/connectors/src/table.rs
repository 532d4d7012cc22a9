use crate::{
    error::QueryError,
    query::{QueryScope, RowQuery},
};
use async_trait::async_trait;
use model::{core::identifiers::RowId, records::row::ProjectedRow};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// An import table held in memory: named columns and string cells.
///
/// Field names are matched against column names without regard to ASCII case.
#[derive(Debug, Clone)]
pub struct ImportTable {
    name: String,
    columns: Vec<String>,
    records: Vec<HashMap<String, String>>,
}

impl ImportTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record. Cells for unknown columns are dropped.
    pub fn push(&mut self, cells: impl IntoIterator<Item = (String, String)>) {
        let record = cells
            .into_iter()
            .filter(|(column, _)| self.columns.contains(column))
            .collect();
        self.records.push(record);
    }

    /// The stored column name that `field` refers to.
    fn column(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(field))
            .map(String::as_str)
    }

    fn check_table(&self, table: &str) -> Result<(), QueryError> {
        if table == self.name {
            Ok(())
        } else {
            Err(QueryError::UnknownTable(table.to_string()))
        }
    }

    /// Resolves each field to its column, in the order given.
    fn resolve_fields(
        &self,
        scope: &QueryScope,
        fields: &[&str],
    ) -> Result<Vec<&str>, QueryError> {
        self.check_table(&scope.table)?;
        fields
            .iter()
            .map(|field| {
                self.column(field).ok_or_else(|| QueryError::UnknownField {
                    table: self.name.clone(),
                    field: field.to_string(),
                })
            })
            .collect()
    }

    fn in_scope<'a>(
        &'a self,
        import_set_column: &'a str,
        import_set: &'a str,
    ) -> impl Iterator<Item = &'a HashMap<String, String>> + 'a {
        self.records
            .iter()
            .filter(move |r| r.get(import_set_column).map(String::as_str) == Some(import_set))
    }
}

/// Serials are compared after trimming; blank cells count as absent.
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[async_trait]
impl RowQuery for ImportTable {
    async fn fields(&self, table: &str) -> Result<Vec<String>, QueryError> {
        self.check_table(table)?;
        Ok(self.columns.clone())
    }

    async fn duplicate_keys(&self, scope: &QueryScope) -> Result<Vec<String>, QueryError> {
        let resolved = self.resolve_fields(
            scope,
            &[scope.import_set_field.as_str(), scope.key_field.as_str()],
        )?;
        let (import_set_column, key_column) = (resolved[0], resolved[1]);

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in self.in_scope(import_set_column, scope.import_set.as_str()) {
            if let Some(key) = present(record.get(key_column)) {
                *counts.entry(key).or_default() += 1;
            }
        }

        let keys: Vec<String> = counts
            .into_iter()
            .rev()
            .filter(|(_, count)| *count > 1)
            .map(|(key, _)| key.to_string())
            .collect();

        debug!(
            "Table '{}' import set {}: {} duplicated keys",
            self.name,
            scope.import_set,
            keys.len()
        );
        Ok(keys)
    }

    async fn rows_for_keys(
        &self,
        scope: &QueryScope,
        keys: &[String],
    ) -> Result<Vec<ProjectedRow>, QueryError> {
        let resolved = self.resolve_fields(
            scope,
            &[
                scope.import_set_field.as_str(),
                scope.key_field.as_str(),
                scope.row_field.as_str(),
            ],
        )?;
        let (import_set_column, key_column, row_column) = (resolved[0], resolved[1], resolved[2]);

        let wanted: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let mut rows: Vec<ProjectedRow> = self
            .in_scope(import_set_column, scope.import_set.as_str())
            .filter_map(|record| {
                let key = present(record.get(key_column))?;
                if !wanted.contains(key) {
                    return None;
                }
                let row = present(record.get(row_column))
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(RowId);
                Some(ProjectedRow::new(Some(key.to_string()), row))
            })
            .collect();

        rows.sort_by(|a, b| b.key.cmp(&a.key).then(b.row.cmp(&a.row)));
        Ok(rows)
    }
}
