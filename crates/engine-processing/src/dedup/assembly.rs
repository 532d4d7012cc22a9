use crate::{error::OnStartError, retry::classify_query_error};
use connectors::{
    error::QueryError,
    query::{QueryScope, RowQuery},
};
use engine_core::{
    context::run::RunContext,
    metrics::Metrics,
    retry::{RetryDisposition, RetryError, RetryPolicy},
};
use model::{execution::errors::RowError, records::batch::ImportBatch};
use std::sync::Arc;
use tracing::{debug, info};

/// Fetches the rows duplicate resolution runs over: only rows whose key is duplicated,
/// newest first within each key.
pub struct BatchAssembler {
    query: Arc<dyn RowQuery>,
    retry: RetryPolicy,
    metrics: Metrics,
}

/// The assembled batch and how many distinct keys it covers.
#[derive(Debug)]
pub struct AssembledBatch {
    pub batch: ImportBatch,
    pub duplicate_keys: usize,
}

impl BatchAssembler {
    pub fn new(query: Arc<dyn RowQuery>, retry: RetryPolicy, metrics: Metrics) -> Self {
        Self {
            query,
            retry,
            metrics,
        }
    }

    pub async fn assemble(&self, ctx: &RunContext) -> Result<AssembledBatch, OnStartError> {
        let settings = ctx.settings();
        let scope = QueryScope {
            table: ctx.map().source_table.clone(),
            import_set: ctx.import_set().clone(),
            import_set_field: settings.import_set_field.clone(),
            key_field: settings.serial_field.clone(),
            row_field: settings.row_field.clone(),
        };

        let keys = self
            .with_retry("duplicate_keys", || {
                let query = self.query.clone();
                let scope = scope.clone();
                async move { query.duplicate_keys(&scope).await }
            })
            .await?;

        if keys.is_empty() {
            debug!("No duplicated keys in import set {}", scope.import_set);
            return Ok(AssembledBatch {
                batch: ImportBatch::new(scope.import_set, Vec::new()),
                duplicate_keys: 0,
            });
        }

        let projected = self
            .with_retry("rows_for_keys", || {
                let query = self.query.clone();
                let scope = scope.clone();
                let keys = keys.clone();
                async move { query.rows_for_keys(&scope, &keys).await }
            })
            .await?;

        let batch = ImportBatch::from_projected(scope.import_set.clone(), projected).map_err(
            |malformed| {
                let RowError::Missing(field) = malformed.error;
                OnStartError::MalformedRow {
                    position: malformed.position,
                    field,
                }
            },
        )?;

        self.metrics.increment_rows_scanned(batch.rows.len() as u64);
        self.metrics.increment_duplicate_keys(keys.len() as u64);
        info!(
            "Import set {}: {} duplicated keys across {} rows",
            scope.import_set,
            keys.len(),
            batch.rows.len()
        );

        Ok(AssembledBatch {
            batch,
            duplicate_keys: keys.len(),
        })
    }

    async fn with_retry<F, Fut, T>(&self, stage: &'static str, op: F) -> Result<T, OnStartError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, QueryError>>,
    {
        let metrics = self.metrics.clone();
        self.retry
            .run(stage, op, move |err| {
                let disposition = classify_query_error(err);
                if disposition == RetryDisposition::Retry {
                    metrics.increment_query_retries();
                }
                disposition
            })
            .await
            .map_err(|err| match err {
                RetryError::Fatal(source) => OnStartError::Query { stage, source },
                RetryError::AttemptsExceeded(source) => {
                    OnStartError::RetriesExhausted { stage, source }
                }
            })
    }
}
