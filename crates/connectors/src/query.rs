use crate::error::QueryError;
use async_trait::async_trait;
use model::{core::identifiers::ImportSetId, records::row::ProjectedRow};

/// Where and how to look for duplicate rows: one table, one import set, and the
/// columns that carry the key and the row ordinal.
#[derive(Debug, Clone)]
pub struct QueryScope {
    pub table: String,
    pub import_set: ImportSetId,
    pub import_set_field: String,
    pub key_field: String,
    pub row_field: String,
}

/// Read access to the rows of an import table.
#[async_trait]
pub trait RowQuery: Send + Sync {
    /// Column names of `table`.
    async fn fields(&self, table: &str) -> Result<Vec<String>, QueryError>;

    /// Keys that occur more than once in the import set (`GROUP BY key HAVING count > 1`).
    /// Rows without a key are not grouped.
    async fn duplicate_keys(&self, scope: &QueryScope) -> Result<Vec<String>, QueryError>;

    /// Every row of the import set whose key is in `keys`, projected to (key, row id)
    /// and ordered by key descending, then row id descending.
    async fn rows_for_keys(
        &self,
        scope: &QueryScope,
        keys: &[String],
    ) -> Result<Vec<ProjectedRow>, QueryError>;
}
