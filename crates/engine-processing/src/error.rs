use connectors::error::QueryError;
use engine_core::error::{ContextError, StateStoreError};
use model::execution::errors::RowField;
use thiserror::Error;

/// Failure reported by the shared on-start setup.
#[derive(Error, Debug)]
pub enum SharedSetupError {
    #[error("{0}")]
    Failed(String),

    #[error("Import table '{table}' lacks required source fields: {}", .fields.join(", "))]
    MissingFields { table: String, fields: Vec<String> },

    #[error("Failed to inspect import table: {0}")]
    Query(#[from] QueryError),
}

/// Why an on-start run aborted. Any of these means nothing was published.
#[derive(Error, Debug)]
pub enum OnStartError {
    #[error("Run context unavailable: {0}")]
    Context(#[from] ContextError),

    #[error("Shared on-start setup failed: {0}")]
    SharedSetup(#[from] SharedSetupError),

    #[error("Query '{stage}' failed: {source}")]
    Query {
        stage: &'static str,
        #[source]
        source: QueryError,
    },

    #[error("Query '{stage}' still failing after retries: {source}")]
    RetriesExhausted {
        stage: &'static str,
        #[source]
        source: QueryError,
    },

    #[error("Fetched row {position} is missing its {field}")]
    MalformedRow { position: usize, field: RowField },

    #[error("Failed to publish ignore set: {0}")]
    Publish(#[from] StateStoreError),
}
