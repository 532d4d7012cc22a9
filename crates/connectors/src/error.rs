use crate::file::csv::error::FileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The requested table is not served by this collaborator.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// A filter, group or projection referenced a column the table does not have.
    #[error("Unknown field '{field}' on table '{table}'")]
    UnknownField { table: String, field: String },

    /// The backing store could not be reached. Safe to retry.
    #[error("Query backend unavailable: {0}")]
    Unavailable(String),

    #[error("File error: {0}")]
    File(#[from] FileError),
}
