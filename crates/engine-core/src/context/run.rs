use crate::error::ContextError;
use chrono::{DateTime, NaiveTime, Utc};
use model::{
    core::identifiers::{ImportSetId, RunId},
    execution::settings::ImportSettings,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The transform map that drives an import: where rows come from and where they go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformMap {
    pub name: String,
    /// Import (staging) table the rows are read from.
    pub source_table: String,
    /// Table the transformed records are written to.
    pub target_table: String,
}

impl TransformMap {
    pub fn new(
        name: impl Into<String>,
        source_table: impl Into<String>,
        target_table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_table: source_table.into(),
            target_table: target_table.into(),
        }
    }
}

/// Everything the on-start stage needs for one run. Constructed once per run; a run
/// without a transform map cannot be constructed at all.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: RunId,
    import_set: ImportSetId,
    map: TransformMap,
    settings: Arc<ImportSettings>,
    started_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(
        map: Option<TransformMap>,
        import_set: ImportSetId,
        settings: ImportSettings,
    ) -> Result<Self, ContextError> {
        Self::with_run_id(RunId::generate(), map, import_set, settings)
    }

    pub fn with_run_id(
        run_id: RunId,
        map: Option<TransformMap>,
        import_set: ImportSetId,
        settings: ImportSettings,
    ) -> Result<Self, ContextError> {
        let map = map.ok_or(ContextError::MissingContext)?;

        if map.source_table.trim().is_empty() {
            return Err(ContextError::InvalidMap {
                map: map.name.clone(),
                reason: "source table is empty".to_string(),
            });
        }
        if import_set.as_str().trim().is_empty() {
            return Err(ContextError::MissingImportSet);
        }

        Ok(RunContext {
            run_id,
            import_set,
            map,
            settings: Arc::new(settings),
            started_at: Utc::now(),
        })
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn import_set(&self) -> &ImportSetId {
        &self.import_set
    }

    pub fn map(&self) -> &TransformMap {
        &self.map
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Midnight (UTC) of the day the run started.
    pub fn date_today(&self) -> DateTime<Utc> {
        self.started_at
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }
}
