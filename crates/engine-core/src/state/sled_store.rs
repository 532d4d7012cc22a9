use crate::{
    error::StateStoreError,
    state::{IgnoreSetStore, PublishedIgnoreSet},
};
use async_trait::async_trait;
use model::core::identifiers::RunId;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::Path;
use tracing::debug;

/// Published ignore sets persisted in a sled database, one key per run.
pub struct SledIgnoreSetStore {
    db: sled::Db,
}

impl SledIgnoreSetStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StateStoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    #[inline]
    fn key(run_id: &RunId) -> String {
        format!("ignore:{}", run_id.as_str())
    }
}

#[async_trait]
impl IgnoreSetStore for SledIgnoreSetStore {
    async fn publish(&self, published: &PublishedIgnoreSet) -> Result<(), StateStoreError> {
        let key = Self::key(&published.run_id);
        let bytes = bincode::serialize(published)?;

        // Check-then-set must be atomic so two publishers for one run cannot both win.
        let result = self.db.transaction::<_, _, StateStoreError>(|tx_db| {
            if tx_db.get(&key)?.is_some() {
                return Err(ConflictableTransactionError::Abort(
                    StateStoreError::AlreadyPublished {
                        run_id: published.run_id.to_string(),
                    },
                ));
            }
            tx_db.insert(key.as_bytes(), bytes.as_slice())?;
            Ok(())
        });

        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(e)) => return Err(e.into()),
        }

        self.db.flush_async().await?;
        debug!(
            "Published {} ignored rows for run {}",
            published.rows.len(),
            published.run_id
        );
        Ok(())
    }

    async fn load(&self, run_id: &RunId) -> Result<Option<PublishedIgnoreSet>, StateStoreError> {
        match self.db.get(Self::key(run_id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}
