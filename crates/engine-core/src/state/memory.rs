use crate::{
    error::StateStoreError,
    state::{IgnoreSetStore, PublishedIgnoreSet},
};
use async_trait::async_trait;
use model::core::identifiers::RunId;
use std::collections::{HashMap, hash_map::Entry};
use tokio::sync::RwLock;

/// Process-local store; published sets live as long as the store.
#[derive(Default)]
pub struct MemoryIgnoreSetStore {
    published: RwLock<HashMap<RunId, PublishedIgnoreSet>>,
}

impl MemoryIgnoreSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the ignore set of a finished run.
    pub async fn discard(&self, run_id: &RunId) -> Option<PublishedIgnoreSet> {
        self.published.write().await.remove(run_id)
    }
}

#[async_trait]
impl IgnoreSetStore for MemoryIgnoreSetStore {
    async fn publish(&self, published: &PublishedIgnoreSet) -> Result<(), StateStoreError> {
        let mut guard = self.published.write().await;
        match guard.entry(published.run_id.clone()) {
            Entry::Occupied(_) => Err(StateStoreError::AlreadyPublished {
                run_id: published.run_id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(published.clone());
                Ok(())
            }
        }
    }

    async fn load(&self, run_id: &RunId) -> Result<Option<PublishedIgnoreSet>, StateStoreError> {
        Ok(self.published.read().await.get(run_id).cloned())
    }
}
