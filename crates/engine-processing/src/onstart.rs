use crate::{
    dedup::{assembly::BatchAssembler, resolve_duplicates},
    error::OnStartError,
    setup::SharedSetup,
};
use chrono::Utc;
use connectors::query::RowQuery;
use engine_core::{
    context::run::{RunContext, TransformMap},
    metrics::Metrics,
    retry::RetryPolicy,
    state::{IgnoreSetStore, PublishedIgnoreSet},
};
use model::{
    core::identifiers::{ImportSetId, RunId},
    execution::settings::ImportSettings,
    records::ignore::IgnoreSet,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Result of a successful on-start run. The same ignore set has been published.
#[derive(Debug, Clone, Serialize)]
pub struct OnStartOutcome {
    pub run_id: RunId,
    pub import_set: ImportSetId,
    pub map: String,
    pub duplicate_keys: usize,
    pub rows_examined: usize,
    pub ignored: IgnoreSet,
}

/// The on-start stage: shared setup, then duplicate resolution, then publication.
/// Each step runs only if the previous one succeeded.
pub struct OnStartStage {
    setup: Arc<dyn SharedSetup>,
    query: Arc<dyn RowQuery>,
    store: Arc<dyn IgnoreSetStore>,
    retry: RetryPolicy,
    metrics: Metrics,
}

impl OnStartStage {
    pub fn new(
        setup: Arc<dyn SharedSetup>,
        query: Arc<dyn RowQuery>,
        store: Arc<dyn IgnoreSetStore>,
    ) -> Self {
        Self {
            setup,
            query,
            store,
            retry: RetryPolicy::for_query(),
            metrics: Metrics::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Builds the run context and runs the stage. A missing transform map aborts here,
    /// before any collaborator is called.
    pub async fn start(
        &self,
        map: Option<TransformMap>,
        import_set: ImportSetId,
        settings: ImportSettings,
    ) -> Result<OnStartOutcome, OnStartError> {
        match RunContext::new(map, import_set, settings) {
            Ok(ctx) => self.run(&ctx).await,
            Err(err) => {
                error!(
                    "The transform map is not available to the on-start stage. Aborting transform."
                );
                self.metrics.increment_runs_aborted();
                Err(err.into())
            }
        }
    }

    pub async fn run(&self, ctx: &RunContext) -> Result<OnStartOutcome, OnStartError> {
        info!(
            "On-start for map '{}', import set {} (run {})",
            ctx.map().name,
            ctx.import_set(),
            ctx.run_id()
        );

        match self.execute(ctx).await {
            Ok(outcome) => {
                self.metrics.increment_runs_completed();
                Ok(outcome)
            }
            Err(err) => {
                error!("Error during on-start execution: {err}");
                self.metrics.increment_runs_aborted();
                Err(err)
            }
        }
    }

    async fn execute(&self, ctx: &RunContext) -> Result<OnStartOutcome, OnStartError> {
        self.setup.perform(ctx).await?;

        let assembler = BatchAssembler::new(
            self.query.clone(),
            self.retry.clone(),
            self.metrics.clone(),
        );
        let assembled = assembler.assemble(ctx).await?;

        let ignored: IgnoreSet = resolve_duplicates(&assembled.batch.rows)
            .into_iter()
            .collect();

        self.store
            .publish(&PublishedIgnoreSet {
                run_id: ctx.run_id().clone(),
                import_set: ctx.import_set().clone(),
                table: ctx.map().source_table.clone(),
                rows: ignored.clone(),
                published_at: Utc::now(),
            })
            .await?;

        self.metrics.increment_rows_ignored(ignored.len() as u64);
        info!(
            "Run {}: {} duplicate rows will be skipped",
            ctx.run_id(),
            ignored.len()
        );

        Ok(OnStartOutcome {
            run_id: ctx.run_id().clone(),
            import_set: ctx.import_set().clone(),
            map: ctx.map().name.clone(),
            duplicate_keys: assembled.duplicate_keys,
            rows_examined: assembled.batch.rows.len(),
            ignored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SharedSetupError;
    use async_trait::async_trait;
    use connectors::{
        error::QueryError,
        query::QueryScope,
        table::ImportTable,
    };
    use engine_core::state::memory::MemoryIgnoreSetStore;
    use model::{core::identifiers::RowId, records::row::ProjectedRow};
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    struct OkSetup;

    #[async_trait]
    impl SharedSetup for OkSetup {
        async fn perform(&self, _ctx: &RunContext) -> Result<(), SharedSetupError> {
            Ok(())
        }
    }

    struct FailingSetup;

    #[async_trait]
    impl SharedSetup for FailingSetup {
        async fn perform(&self, _ctx: &RunContext) -> Result<(), SharedSetupError> {
            Err(SharedSetupError::Failed("model lookup failed".into()))
        }
    }

    /// Counts calls and fails the first `failures` with a transient error.
    struct CountingQuery {
        inner: ImportTable,
        calls: AtomicUsize,
        failures: usize,
    }

    impl CountingQuery {
        fn new(inner: ImportTable, failures: usize) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
                failures,
            }
        }

        fn tick(&self) -> Result<(), QueryError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(QueryError::Unavailable("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RowQuery for CountingQuery {
        async fn fields(&self, table: &str) -> Result<Vec<String>, QueryError> {
            self.inner.fields(table).await
        }

        async fn duplicate_keys(&self, scope: &QueryScope) -> Result<Vec<String>, QueryError> {
            self.tick()?;
            self.inner.duplicate_keys(scope).await
        }

        async fn rows_for_keys(
            &self,
            scope: &QueryScope,
            keys: &[String],
        ) -> Result<Vec<ProjectedRow>, QueryError> {
            self.tick()?;
            self.inner.rows_for_keys(scope, keys).await
        }
    }

    /// Returns duplicated keys but a row without its ordinal.
    struct BrokenRows;

    #[async_trait]
    impl RowQuery for BrokenRows {
        async fn fields(&self, _table: &str) -> Result<Vec<String>, QueryError> {
            Ok(Vec::new())
        }

        async fn duplicate_keys(&self, _scope: &QueryScope) -> Result<Vec<String>, QueryError> {
            Ok(vec!["A".into()])
        }

        async fn rows_for_keys(
            &self,
            _scope: &QueryScope,
            _keys: &[String],
        ) -> Result<Vec<ProjectedRow>, QueryError> {
            Ok(vec![
                ProjectedRow::new(Some("A".into()), Some(RowId(2))),
                ProjectedRow::new(Some("A".into()), None),
            ])
        }
    }

    fn import_table(rows: &[(&str, &str, u64)]) -> ImportTable {
        let mut table = ImportTable::new(
            "u_stock",
            vec![
                "sys_import_set".into(),
                "u_serienr".into(),
                "sys_import_row".into(),
            ],
        );
        for (set, serial, row) in rows {
            table.push([
                ("sys_import_set".to_string(), set.to_string()),
                ("u_serienr".to_string(), serial.to_string()),
                ("sys_import_row".to_string(), row.to_string()),
            ]);
        }
        table
    }

    fn ctx(import_set: &str) -> RunContext {
        RunContext::new(
            Some(TransformMap::new("Voorraadlijst", "u_stock", "alm_hardware")),
            import_set.into(),
            ImportSettings::default(),
        )
        .unwrap()
    }

    fn stage(query: Arc<dyn RowQuery>, store: Arc<MemoryIgnoreSetStore>) -> OnStartStage {
        OnStartStage::new(Arc::new(OkSetup), query, store)
            .with_retry(RetryPolicy::new(3, Duration::ZERO, Duration::ZERO))
    }

    #[tokio::test]
    async fn keeps_newest_row_per_serial_and_publishes_the_rest() {
        let table = import_table(&[
            ("S1", "A", 1),
            ("S1", "B", 2),
            ("S1", "A", 3),
            ("S1", "C", 4),
            ("S1", "A", 5),
            ("S1", "B", 6),
        ]);
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = stage(Arc::new(table), store.clone());
        let ctx = ctx("S1");

        let outcome = stage.run(&ctx).await.unwrap();

        // sorted B(6,2) then A(5,3,1): keepers 6 and 5
        assert_eq!(outcome.ignored.as_slice(), &[RowId(2), RowId(3), RowId(1)]);
        assert_eq!(outcome.duplicate_keys, 2);
        assert_eq!(outcome.rows_examined, 5);

        let published = store.load(ctx.run_id()).await.unwrap().unwrap();
        assert_eq!(published.rows, outcome.ignored);

        let snap = stage.metrics().snapshot();
        assert_eq!(snap.runs_completed, 1);
        assert_eq!(snap.rows_ignored, 3);
    }

    #[tokio::test]
    async fn no_duplicates_publishes_empty_set_without_fetching_rows() {
        let query = Arc::new(CountingQuery::new(
            import_table(&[("S1", "A", 1), ("S1", "B", 2)]),
            0,
        ));
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = stage(query.clone(), store.clone());
        let ctx = ctx("S1");

        let outcome = stage.run(&ctx).await.unwrap();

        assert!(outcome.ignored.is_empty());
        assert_eq!(query.calls.load(Ordering::SeqCst), 1);
        assert!(store.load(ctx.run_id()).await.unwrap().unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn setup_failure_skips_deduplication() {
        let query = Arc::new(CountingQuery::new(import_table(&[("S1", "A", 1)]), 0));
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = OnStartStage::new(Arc::new(FailingSetup), query.clone(), store.clone());
        let ctx = ctx("S1");

        let err = stage.run(&ctx).await.unwrap_err();

        assert!(matches!(err, OnStartError::SharedSetup(_)));
        assert!(err.to_string().contains("model lookup failed"));
        assert_eq!(query.calls.load(Ordering::SeqCst), 0);
        assert!(store.load(ctx.run_id()).await.unwrap().is_none());
        assert_eq!(stage.metrics().snapshot().runs_aborted, 1);
    }

    #[tokio::test]
    async fn missing_map_aborts_before_setup() {
        let query = Arc::new(CountingQuery::new(import_table(&[]), 0));
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = stage(query.clone(), store);

        let err = stage
            .start(None, "S1".into(), ImportSettings::default())
            .await
            .unwrap_err();

        assert!(matches!(err, OnStartError::Context(_)));
        assert_eq!(query.calls.load(Ordering::SeqCst), 0);
        assert_eq!(stage.metrics().snapshot().runs_aborted, 1);
    }

    #[tokio::test]
    async fn malformed_row_fails_whole_batch() {
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = stage(Arc::new(BrokenRows), store.clone());
        let ctx = ctx("S1");

        let err = stage.run(&ctx).await.unwrap_err();

        assert!(matches!(err, OnStartError::MalformedRow { position: 1, .. }));
        assert!(store.load(ctx.run_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transient_query_failures_are_retried() {
        let query = Arc::new(CountingQuery::new(
            import_table(&[("S1", "A", 1), ("S1", "A", 2)]),
            2,
        ));
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = stage(query.clone(), store);

        let outcome = stage.run(&ctx("S1")).await.unwrap();

        assert_eq!(outcome.ignored.as_slice(), &[RowId(1)]);
        assert_eq!(stage.metrics().snapshot().query_retries, 2);
    }

    #[tokio::test]
    async fn persistent_query_failure_exhausts_retries() {
        let query = Arc::new(CountingQuery::new(import_table(&[]), usize::MAX));
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = stage(query, store);

        let err = stage.run(&ctx("S1")).await.unwrap_err();
        assert!(matches!(
            err,
            OnStartError::RetriesExhausted {
                stage: "duplicate_keys",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn runs_over_different_import_sets_do_not_leak() {
        let table = import_table(&[
            ("S1", "A", 1),
            ("S1", "A", 2),
            ("S2", "A", 3),
            ("S2", "B", 4),
        ]);
        let store = Arc::new(MemoryIgnoreSetStore::new());
        let stage = stage(Arc::new(table), store.clone());

        let first = stage.run(&ctx("S1")).await.unwrap();
        let second = stage.run(&ctx("S2")).await.unwrap();

        assert_eq!(first.ignored.as_slice(), &[RowId(1)]);
        assert!(second.ignored.is_empty());
    }
}
