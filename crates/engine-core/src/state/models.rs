use chrono::{DateTime, Utc};
use model::{
    core::identifiers::{ImportSetId, RunId},
    records::ignore::IgnoreSet,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PublishedIgnoreSet {
    pub run_id: RunId,
    pub import_set: ImportSetId,
    pub table: String,
    pub rows: IgnoreSet,
    pub published_at: DateTime<Utc>,
}
